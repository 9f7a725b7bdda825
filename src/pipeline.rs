//! The full comparison: amortize, aggregate, rank.
//!
//! One bank whose record is incomplete or whose limits the request does not
//! meet is reported in [`OfferComparison::excluded`]; it never stops the rest
//! of the catalog from being ranked.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::amortization;
use crate::bank::{BankCatalog, BankOffer};
use crate::config::CalculatorConfig;
use crate::costs;
use crate::eligibility::{Ineligibility, check_eligibility};
use crate::error::{CalculatorError, CalculatorResult};
use crate::params::LoanParameters;
use crate::report::{self, Comparison, SetSummary};
use crate::result::CalculationResult;
use crate::risk::{self, Affordability, RiskScenario};
use crate::scoring;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    Ineligible { reasons: Vec<Ineligibility> },
    Failed { error: CalculatorError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedOffer {
    pub bank_id: String,
    pub bank_name: String,
    pub reason: ExclusionReason,
}

/// Ranked offers, best first, plus the banks left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferComparison {
    pub results: Vec<CalculationResult>,
    pub excluded: Vec<ExcludedOffer>,
}

/// Everything shown in the detail view of one offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAnalysis {
    pub result: CalculationResult,
    pub affordability: Affordability,
    pub rate_shocks: Vec<RiskScenario>,
    pub comparison: Comparison,
}

/// Computes one bank's offer. The result is unscored.
///
/// # Errors
///
/// [`CalculatorError::MissingBankField`] when the bank cannot price the
/// requested rate type, [`CalculatorError::InvalidInput`] when the loan
/// cannot be amortized.
pub fn calculate_offer(
    params: &LoanParameters,
    bank: &BankOffer,
    catalog_index: usize,
    config: &CalculatorConfig,
) -> CalculatorResult<CalculationResult> {
    let ltv_percent = params.ltv_percent();
    let interest_rate = costs::effective_rate(bank, params.interest_rate_type, ltv_percent)?;
    let amortized = amortization::compute_for(
        params.loan_amount,
        interest_rate,
        params.loan_period_years,
        params.installment_type,
    )?;
    let breakdown = costs::aggregate(&amortized, bank, params, interest_rate, config.rrso_method)?;

    debug!(
        bank_id = %bank.id,
        %interest_rate,
        monthly_payment = %amortized.monthly_payment,
        total_cost = %breakdown.total_cost,
        rrso = %breakdown.rrso,
        "Calculated offer"
    );

    Ok(CalculationResult {
        bank_id: bank.id.clone(),
        bank_name: bank.name.clone(),
        catalog_index,
        interest_rate_type: params.interest_rate_type,
        installment_type: params.installment_type,
        monthly_payment: amortized.monthly_payment,
        total_cost: breakdown.total_cost,
        total_interest: amortized.total_interest,
        commission: breakdown.commission,
        insurance: breakdown.insurance,
        account_fees: breakdown.account_fees,
        interest_rate: breakdown.interest_rate,
        rrso: breakdown.rrso,
        ltv_percent: ltv_percent.round_dp(2),
        net_advantages: bank.net_advantages(),
        score: 0,
        is_recommended: false,
    })
}

/// Computes and ranks every offer in the catalog.
///
/// # Errors
///
/// Only invalid loan parameters fail the whole comparison; per-bank problems
/// end up in [`OfferComparison::excluded`].
#[instrument(
    skip_all,
    fields(
        banks = catalog.len(),
        loan_amount = %params.loan_amount,
        years = params.loan_period_years,
    )
)]
pub fn calculate_offers(
    params: &LoanParameters,
    catalog: &BankCatalog,
    config: &CalculatorConfig,
) -> CalculatorResult<OfferComparison> {
    params.validate(&config.bounds)?;

    let mut results = Vec::with_capacity(catalog.len());
    let mut excluded = Vec::new();

    for (catalog_index, bank) in catalog.banks().iter().enumerate() {
        let reasons = check_eligibility(bank, params);
        if !reasons.is_empty() {
            debug!(bank_id = %bank.id, ?reasons, "Bank not eligible");
            excluded.push(ExcludedOffer {
                bank_id: bank.id.clone(),
                bank_name: bank.name.clone(),
                reason: ExclusionReason::Ineligible { reasons },
            });
            continue;
        }

        match calculate_offer(params, bank, catalog_index, config) {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!(bank_id = %bank.id, %error, "Excluding bank from comparison");
                excluded.push(ExcludedOffer {
                    bank_id: bank.id.clone(),
                    bank_name: bank.name.clone(),
                    reason: ExclusionReason::Failed { error },
                });
            }
        }
    }

    let results = scoring::rank(results, config);
    debug!(
        ranked = results.len(),
        excluded = excluded.len(),
        "Offer comparison complete"
    );

    Ok(OfferComparison { results, excluded })
}

impl OfferComparison {
    pub fn get(&self, bank_id: &str) -> Option<&CalculationResult> {
        self.results.iter().find(|r| r.bank_id == bank_id)
    }

    pub fn recommended(&self) -> impl Iterator<Item = &CalculationResult> {
        self.results.iter().filter(|r| r.is_recommended)
    }

    pub fn summary(&self) -> Option<SetSummary> {
        report::summarize(&self.results)
    }

    /// Affordability, rate shocks and comparison for one ranked offer.
    /// `None` when the bank is not among the results.
    pub fn analyze(
        &self,
        bank_id: &str,
        params: &LoanParameters,
        config: &CalculatorConfig,
    ) -> Option<CalculatorResult<OfferAnalysis>> {
        let result = self.get(bank_id)?;
        Some(self.analyze_result(result, params, config))
    }

    fn analyze_result(
        &self,
        result: &CalculationResult,
        params: &LoanParameters,
        config: &CalculatorConfig,
    ) -> Result<OfferAnalysis, CalculatorError> {
        Ok(OfferAnalysis {
            result: result.clone(),
            affordability: risk::analyze_affordability(result, params, &config.affordability)?,
            rate_shocks: risk::simulate_rate_shocks(
                result,
                params,
                &config.rate_shock_deltas,
                &config.affordability,
            )?,
            comparison: report::compare(result, &self.results),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::test_support::bank;
    use crate::params::InterestRateType;
    use rust_decimal_macros::dec;

    fn params() -> LoanParameters {
        LoanParameters::new(dec!(400000), 25, dec!(15000)).with_down_payment(dec!(100000))
    }

    #[test]
    fn test_calculate_offer_fills_every_field() {
        let mut offer = bank("a");
        offer.commission_rate = dec!(1);
        offer.advantages = vec!["Online application".to_string()];

        let result = calculate_offer(&params(), &offer, 4, &CalculatorConfig::default()).unwrap();

        assert_eq!(result.catalog_index, 4);
        assert_eq!(result.interest_rate, dec!(7.5));
        assert_eq!(result.monthly_payment, dec!(2955.96));
        assert_eq!(result.total_interest, dec!(486788.00));
        assert_eq!(result.commission, dec!(4000));
        assert_eq!(result.total_cost, dec!(890788.00));
        assert_eq!(result.rrso, dec!(7.54));
        assert_eq!(result.ltv_percent, dec!(80));
        assert_eq!(result.net_advantages, 1);
    }

    #[test]
    fn test_invalid_params_fail_the_comparison() {
        let catalog = BankCatalog::new(vec![bank("a")]).unwrap();
        let params = LoanParameters::new(dec!(400000), 50, dec!(15000));
        assert!(matches!(
            calculate_offers(&params, &catalog, &CalculatorConfig::default()),
            Err(CalculatorError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_incomplete_bank_is_excluded_not_fatal() {
        let mut broken = bank("broken");
        broken.fixed_interest_rate = None;
        let catalog = BankCatalog::new(vec![broken, bank("ok")]).unwrap();
        let params = params().with_interest_rate_type(InterestRateType::Fixed);

        let comparison = calculate_offers(&params, &catalog, &CalculatorConfig::default()).unwrap();

        assert_eq!(comparison.results.len(), 1);
        assert_eq!(comparison.results[0].bank_id, "ok");
        assert_eq!(comparison.excluded.len(), 1);
        assert_eq!(
            comparison.excluded[0].reason,
            ExclusionReason::Failed {
                error: CalculatorError::missing("broken", "fixedInterestRate")
            }
        );
    }

    #[test]
    fn test_exclusion_keeps_the_typed_error_when_serialized() {
        let reason = ExclusionReason::Failed {
            error: CalculatorError::missing("broken", "fixedInterestRate"),
        };

        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "failed",
                "error": {
                    "kind": "missing_bank_field",
                    "bank_id": "broken",
                    "field": "fixedInterestRate"
                }
            })
        );
        assert_eq!(serde_json::from_value::<ExclusionReason>(json).unwrap(), reason);
    }

    #[test]
    fn test_analyze_unknown_bank() {
        let comparison = OfferComparison::default();
        assert!(comparison.analyze("nope", &params(), &CalculatorConfig::default()).is_none());
    }

    #[test]
    fn test_analyze_fixed_offer_skips_rate_shocks() {
        let catalog = BankCatalog::new(vec![bank("a"), bank("b")]).unwrap();
        let params = params().with_interest_rate_type(InterestRateType::Fixed);
        let config = CalculatorConfig::default();
        let comparison = calculate_offers(&params, &catalog, &config).unwrap();

        let analysis = comparison.analyze("b", &params, &config).unwrap().unwrap();

        assert!(analysis.rate_shocks.is_empty());
        assert_eq!(analysis.comparison.rank, 2);
        assert_eq!(analysis.comparison.monthly_payment_delta_percent, dec!(0));
    }
}
