//! Affordability and interest-rate risk of an offer.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization;
use crate::config::AffordabilityThresholds;
use crate::error::{CalculatorError, CalculatorResult};
use crate::params::{InterestRateType, LoanParameters};
use crate::result::CalculationResult;

/// Debt-to-income tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityLevel {
    Excellent,
    Good,
    Moderate,
    Risky,
    Critical,
}

impl AffordabilityLevel {
    pub fn from_dti(dti_percentage: Decimal, thresholds: &AffordabilityThresholds) -> Self {
        if dti_percentage <= thresholds.excellent {
            AffordabilityLevel::Excellent
        } else if dti_percentage <= thresholds.good {
            AffordabilityLevel::Good
        } else if dti_percentage <= thresholds.moderate {
            AffordabilityLevel::Moderate
        } else if dti_percentage <= thresholds.risky {
            AffordabilityLevel::Risky
        } else {
            AffordabilityLevel::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordability {
    pub dti_percentage: Decimal,
    /// Income left after the installment.
    pub remaining_income: Decimal,
    pub affordability_level: AffordabilityLevel,
}

/// Installment after a rate increase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScenario {
    pub rate_delta_pp: Decimal,
    pub new_rate: Decimal,
    pub new_monthly_payment: Decimal,
    pub increase_amount: Decimal,
    /// DTI at the new installment stays within the risky tier.
    pub is_affordable: bool,
}

/// Monthly payment as a percentage of monthly income.
pub fn dti_percentage(
    monthly_payment: Decimal,
    monthly_income: Decimal,
) -> CalculatorResult<Decimal> {
    if monthly_income <= Decimal::ZERO {
        return Err(CalculatorError::invalid("monthly_income", "must be positive"));
    }
    Ok(monthly_payment / monthly_income * dec!(100))
}

pub fn analyze_affordability(
    result: &CalculationResult,
    params: &LoanParameters,
    thresholds: &AffordabilityThresholds,
) -> CalculatorResult<Affordability> {
    let dti = dti_percentage(result.monthly_payment, params.monthly_income)?;
    Ok(Affordability {
        dti_percentage: dti,
        remaining_income: params.monthly_income - result.monthly_payment,
        affordability_level: AffordabilityLevel::from_dti(dti, thresholds),
    })
}

/// Re-amortizes a variable offer at `rate + delta` for every delta.
///
/// Fixed offers carry no rate risk over their term and yield no scenarios.
pub fn simulate_rate_shocks(
    result: &CalculationResult,
    params: &LoanParameters,
    deltas: &[Decimal],
    thresholds: &AffordabilityThresholds,
) -> CalculatorResult<Vec<RiskScenario>> {
    if result.interest_rate_type == InterestRateType::Fixed {
        return Ok(Vec::new());
    }

    deltas
        .iter()
        .map(|delta| {
            let new_rate = result.interest_rate + delta;
            let shocked = amortization::compute_for(
                params.loan_amount,
                new_rate,
                params.loan_period_years,
                result.installment_type,
            )?;
            let dti = dti_percentage(shocked.monthly_payment, params.monthly_income)?;
            Ok(RiskScenario {
                rate_delta_pp: *delta,
                new_rate,
                new_monthly_payment: shocked.monthly_payment,
                increase_amount: shocked.monthly_payment - result.monthly_payment,
                is_affordable: dti <= thresholds.risky,
            })
        })
        .collect()
}
