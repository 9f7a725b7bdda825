//! Bank offer catalog.
//!
//! Records are read from JSON in the shape the catalog maintenance jobs
//! write it (`camelCase` keys, percentages in percent units) and validated
//! once here, so the calculator can rely on well-formed records.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::params::{InterestRateType, LoanPurpose};

/// How often the insurance premium is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceMode {
    Monthly,
    #[default]
    Annual,
}

/// Additive rate surcharges (percentage points) for high loan-to-value loans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LtvAdjustments {
    /// Applied when LTV exceeds 80%.
    #[serde(default)]
    pub ratio80: Decimal,
    /// Applied when LTV exceeds 90%.
    #[serde(default)]
    pub ratio90: Decimal,
    /// Applied when LTV exceeds 95%.
    #[serde(default)]
    pub ratio95: Decimal,
}

/// Affiliate program attached to an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliate {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

/// A bank's mortgage offer as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankOffer {
    pub id: String,
    pub name: String,
    /// Headline rate advertised by the bank (%).
    pub base_interest_rate: Decimal,
    /// Reference rate component of a variable offer (%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wibor: Option<Decimal>,
    /// Bank margin over WIBOR (percentage points).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Decimal>,
    /// Rate of a fixed offer (%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_interest_rate: Option<Decimal>,
    /// One-time commission (% of the loan amount).
    #[serde(default)]
    pub commission_rate: Decimal,
    /// Insurance premium per charge (% of the loan amount).
    #[serde(default)]
    pub insurance_rate: Decimal,
    #[serde(default)]
    pub insurance_mode: InsuranceMode,
    /// Mandatory account fee charged every month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_fee_monthly: Option<Decimal>,
    pub min_loan_amount: Decimal,
    pub max_loan_amount: Decimal,
    /// Shortest accepted term in years.
    pub min_loan_period: u32,
    /// Longest accepted term in years.
    pub max_loan_period: u32,
    #[serde(default)]
    pub min_down_payment_percent: Decimal,
    pub supported_purposes: BTreeSet<LoanPurpose>,
    pub supported_interest_rate_types: BTreeSet<InterestRateType>,
    #[serde(default)]
    pub ltv_adjustments: LtvAdjustments,
    #[serde(default)]
    pub advantages: Vec<String>,
    #[serde(default)]
    pub disadvantages: Vec<String>,
    #[serde(default)]
    pub special_offers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate: Option<Affiliate>,
}

impl BankOffer {
    pub fn supports_rate_type(&self, rate_type: InterestRateType) -> bool {
        self.supported_interest_rate_types.contains(&rate_type)
    }

    /// Whether the record carries every rate component `rate_type` needs.
    pub fn can_price(&self, rate_type: InterestRateType) -> bool {
        match rate_type {
            InterestRateType::Fixed => self.fixed_interest_rate.is_some(),
            InterestRateType::Variable => self.wibor.is_some() && self.margin.is_some(),
        }
    }

    /// Advantages minus disadvantages.
    pub fn net_advantages(&self) -> i64 {
        self.advantages.len() as i64 - self.disadvantages.len() as i64
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |field: &str, message: &str| CatalogError::InvalidRecord {
            bank_id: self.id.clone(),
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id", "cannot be empty"));
        }

        let rates = [
            ("baseInterestRate", Some(self.base_interest_rate)),
            ("wibor", self.wibor),
            ("margin", self.margin),
            ("fixedInterestRate", self.fixed_interest_rate),
            ("commissionRate", Some(self.commission_rate)),
            ("insuranceRate", Some(self.insurance_rate)),
            ("accountFeeMonthly", self.account_fee_monthly),
        ];
        for (field, value) in rates {
            if value.is_some_and(|v| v < Decimal::ZERO) {
                return Err(invalid(field, "cannot be negative"));
            }
        }

        if self.min_loan_amount < Decimal::ZERO || self.min_loan_amount > self.max_loan_amount {
            return Err(invalid("minLoanAmount", "must be between 0 and maxLoanAmount"));
        }
        if self.min_loan_period == 0 || self.min_loan_period > self.max_loan_period {
            return Err(invalid("minLoanPeriod", "must be between 1 and maxLoanPeriod"));
        }
        if self.min_down_payment_percent < Decimal::ZERO
            || self.min_down_payment_percent > dec!(100)
        {
            return Err(invalid("minDownPaymentPercent", "must be between 0 and 100"));
        }
        if self.supported_purposes.is_empty() {
            return Err(invalid("supportedPurposes", "cannot be empty"));
        }
        if self.supported_interest_rate_types.is_empty() {
            return Err(invalid("supportedInterestRateTypes", "cannot be empty"));
        }

        Ok(())
    }
}

/// Immutable set of offers in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankCatalog {
    banks: Vec<BankOffer>,
}

impl BankCatalog {
    /// Builds a validated catalog.
    pub fn new(banks: Vec<BankOffer>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for bank in &banks {
            bank.validate()?;
            if !seen.insert(bank.id.as_str()) {
                return Err(CatalogError::DuplicateId(bank.id.clone()));
            }
            for rate_type in &bank.supported_interest_rate_types {
                if !bank.can_price(*rate_type) {
                    warn!(
                        bank_id = %bank.id,
                        ?rate_type,
                        "Bank advertises a rate type it has no rate components for"
                    );
                }
            }
        }
        debug!(banks = banks.len(), "Loaded bank catalog");
        Ok(Self { banks })
    }

    /// Parses a catalog document of the form `{"banks": [...]}`.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let raw: BankCatalog =
            serde_json::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;
        Self::new(raw.banks)
    }

    /// Reads and parses a catalog file.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bank catalog {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid bank catalog {}", path.display()))
    }

    pub fn banks(&self) -> &[BankOffer] {
        &self.banks
    }

    pub fn get(&self, id: &str) -> Option<&BankOffer> {
        self.banks.iter().find(|bank| bank.id == id)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::bank;
    use super::*;
    use rstest::rstest;

    const CATALOG: &str = r#"{
        "banks": [
            {
                "id": "pko",
                "name": "PKO BP",
                "baseInterestRate": 7.45,
                "wibor": 5.85,
                "margin": 1.6,
                "commissionRate": 0,
                "insuranceRate": 0.02,
                "insuranceMode": "monthly",
                "minLoanAmount": 100000,
                "maxLoanAmount": 2500000,
                "minLoanPeriod": 5,
                "maxLoanPeriod": 35,
                "minDownPaymentPercent": 20,
                "supportedPurposes": ["purchase", "construction"],
                "supportedInterestRateTypes": ["variable"],
                "ltvAdjustments": { "ratio80": 0.2, "ratio90": 0.3 },
                "advantages": ["No commission"],
                "affiliate": { "url": "https://example.com/pko" }
            }
        ]
    }"#;

    #[test]
    fn test_parses_catalog_document() {
        let catalog = BankCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 1);
        let pko = catalog.get("pko").unwrap();
        assert_eq!(pko.insurance_mode, InsuranceMode::Monthly);
        assert_eq!(pko.ltv_adjustments.ratio90, dec!(0.3));
        assert_eq!(pko.ltv_adjustments.ratio95, Decimal::ZERO);
        assert_eq!(pko.fixed_interest_rate, None);
        assert!(pko.can_price(InterestRateType::Variable));
        assert!(!pko.can_price(InterestRateType::Fixed));
        assert_eq!(pko.net_advantages(), 1);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = BankCatalog::new(vec![bank("a"), bank("a")]);
        assert_eq!(result, Err(CatalogError::DuplicateId("a".to_string())));
    }

    #[rstest]
    #[case::negative_margin(|b: &mut BankOffer| b.margin = Some(dec!(-0.1)), "margin")]
    #[case::amount_range(|b: &mut BankOffer| b.min_loan_amount = dec!(5000000), "minLoanAmount")]
    #[case::period_range(|b: &mut BankOffer| b.min_loan_period = 40, "minLoanPeriod")]
    #[case::down_payment(
        |b: &mut BankOffer| b.min_down_payment_percent = dec!(120),
        "minDownPaymentPercent"
    )]
    #[case::no_purposes(|b: &mut BankOffer| b.supported_purposes.clear(), "supportedPurposes")]
    fn test_rejects_invalid_record(
        #[case] corrupt: fn(&mut BankOffer),
        #[case] expected_field: &str,
    ) {
        let mut offer = bank("x");
        corrupt(&mut offer);
        match BankCatalog::new(vec![offer]) {
            Err(CatalogError::InvalidRecord { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_keeps_records_missing_rate_components() {
        let mut offer = bank("no-fixed");
        offer.fixed_interest_rate = None;
        let catalog = BankCatalog::new(vec![offer]).unwrap();
        assert!(!catalog.banks()[0].can_price(InterestRateType::Fixed));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            BankCatalog::from_json_str("{\"banks\": [{}]}"),
            Err(CatalogError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = BankCatalog::from_json_file("/nonexistent/banks.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read bank catalog"));
    }
}
