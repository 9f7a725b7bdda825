//! Calculator policy configuration
//!
//! Scoring weights, affordability tiers, rate-shock deltas and form bounds are
//! policy, not contract: they can be tuned from a TOML or JSON file, and every
//! field falls back to its default when omitted.

use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::MAX_TERM_YEARS;
use crate::error::ConfigError;

/// How the RRSO figure of an offer is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RrsoMethod {
    /// Nominal rate plus commission spread evenly over the term.
    #[default]
    Approximate,
    /// Annualized internal rate of return of the borrower's cash flows.
    Irr,
}

/// Complete calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// How many top-ranked offers are flagged as recommended
    #[serde(default = "default_recommended_count")]
    pub recommended_count: usize,

    #[serde(default)]
    pub affordability: AffordabilityThresholds,

    /// Rate increases (percentage points) simulated for variable offers
    #[serde(default = "default_rate_shock_deltas")]
    pub rate_shock_deltas: Vec<Decimal>,

    #[serde(default)]
    pub bounds: ParameterBounds,

    #[serde(default)]
    pub rrso_method: RrsoMethod,

    /// Quiet period before a burst of parameter changes is recalculated
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Relative weights of the score components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_payment_weight")]
    pub monthly_payment: Decimal,
    #[serde(default = "default_total_cost_weight")]
    pub total_cost: Decimal,
    #[serde(default = "default_rrso_weight")]
    pub rrso: Decimal,
    /// Advantages minus disadvantages listed for the bank
    #[serde(default)]
    pub qualitative: Decimal,
}

/// Upper DTI bounds (inclusive, percent) of each affordability tier.
/// Anything above `risky` is critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityThresholds {
    #[serde(default = "default_excellent")]
    pub excellent: Decimal,
    #[serde(default = "default_good")]
    pub good: Decimal,
    #[serde(default = "default_moderate")]
    pub moderate: Decimal,
    #[serde(default = "default_risky")]
    pub risky: Decimal,
}

/// Accepted ranges of the calculator form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    #[serde(default = "default_min_loan_amount")]
    pub min_loan_amount: Decimal,
    #[serde(default = "default_max_loan_amount")]
    pub max_loan_amount: Decimal,
    #[serde(default = "default_min_period")]
    pub min_period_years: u32,
    #[serde(default = "default_max_period")]
    pub max_period_years: u32,
}

// Default values
fn default_recommended_count() -> usize {
    3
}

fn default_rate_shock_deltas() -> Vec<Decimal> {
    vec![dec!(1), dec!(2), dec!(3)]
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_payment_weight() -> Decimal {
    dec!(40)
}

fn default_total_cost_weight() -> Decimal {
    dec!(35)
}

fn default_rrso_weight() -> Decimal {
    dec!(25)
}

fn default_excellent() -> Decimal {
    dec!(30)
}

fn default_good() -> Decimal {
    dec!(40)
}

fn default_moderate() -> Decimal {
    dec!(50)
}

fn default_risky() -> Decimal {
    dec!(60)
}

fn default_min_loan_amount() -> Decimal {
    dec!(10000) // PLN
}

fn default_max_loan_amount() -> Decimal {
    dec!(10000000) // PLN
}

fn default_min_period() -> u32 {
    5
}

fn default_max_period() -> u32 {
    35
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringWeights::default(),
            recommended_count: default_recommended_count(),
            affordability: AffordabilityThresholds::default(),
            rate_shock_deltas: default_rate_shock_deltas(),
            bounds: ParameterBounds::default(),
            rrso_method: RrsoMethod::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            monthly_payment: default_payment_weight(),
            total_cost: default_total_cost_weight(),
            rrso: default_rrso_weight(),
            qualitative: Decimal::ZERO,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> Decimal {
        self.monthly_payment + self.total_cost + self.rrso + self.qualitative
    }
}

impl Default for AffordabilityThresholds {
    fn default() -> Self {
        Self {
            excellent: default_excellent(),
            good: default_good(),
            moderate: default_moderate(),
            risky: default_risky(),
        }
    }
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            min_loan_amount: default_min_loan_amount(),
            max_loan_amount: default_max_loan_amount(),
            min_period_years: default_min_period(),
            max_period_years: default_max_period(),
        }
    }
}

impl CalculatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read calculator config {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        };
        config.with_context(|| format!("Invalid calculator config {}", path.display()))
    }

    /// Validate configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let weights = [
            self.scoring.monthly_payment,
            self.scoring.total_cost,
            self.scoring.rrso,
            self.scoring.qualitative,
        ];
        if weights.iter().any(|w| *w < Decimal::ZERO) {
            errors.push("Scoring weights cannot be negative".to_string());
        }
        if self.scoring.total() <= Decimal::ZERO {
            errors.push("At least one scoring weight must be positive".to_string());
        }

        let tiers = &self.affordability;
        if !(Decimal::ZERO < tiers.excellent
            && tiers.excellent <= tiers.good
            && tiers.good <= tiers.moderate
            && tiers.moderate <= tiers.risky)
        {
            errors.push("Affordability thresholds must be positive and ascending".to_string());
        }

        if self.rate_shock_deltas.iter().any(|d| *d <= Decimal::ZERO) {
            errors.push("Rate shock deltas must be positive".to_string());
        }

        let bounds = &self.bounds;
        if bounds.min_loan_amount <= Decimal::ZERO
            || bounds.min_loan_amount > bounds.max_loan_amount
        {
            errors.push("Loan amount bounds must be positive and ordered".to_string());
        }
        if bounds.min_period_years == 0 || bounds.min_period_years > bounds.max_period_years {
            errors.push("Loan period bounds must be positive and ordered".to_string());
        }
        if bounds.max_period_years > MAX_TERM_YEARS {
            errors.push(format!("Loan period cannot exceed {MAX_TERM_YEARS} years"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CalculatorConfig::default();
        assert_eq!(config.scoring.total(), dec!(100));
        assert_eq!(config.recommended_count, 3);
        assert_eq!(config.affordability.risky, dec!(60));
        assert_eq!(config.rrso_method, RrsoMethod::Approximate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CalculatorConfig::from_toml_str(
            r#"
            recommended_count = 5
            rrso_method = "irr"
            rate_shock_deltas = [0.5, 1.5]

            [scoring]
            qualitative = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.recommended_count, 5);
        assert_eq!(config.rrso_method, RrsoMethod::Irr);
        assert_eq!(config.rate_shock_deltas, vec![dec!(0.5), dec!(1.5)]);
        assert_eq!(config.scoring.monthly_payment, dec!(40));
        assert_eq!(config.scoring.qualitative, dec!(10));
        assert_eq!(config.bounds.max_period_years, 35);
    }

    #[test]
    fn test_json_config() {
        let config = CalculatorConfig::from_json_str(r#"{"debounce_ms": 150}"#).unwrap();
        assert_eq!(config.debounce_ms, 150);
    }

    #[test]
    fn test_validate_collects_every_error() {
        let mut config = CalculatorConfig::default();
        config.scoring = ScoringWeights {
            monthly_payment: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            rrso: Decimal::ZERO,
            qualitative: Decimal::ZERO,
        };
        config.affordability.good = dec!(20);
        config.rate_shock_deltas = vec![dec!(-1)];

        match config.validate() {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_period_bound_beyond_amortizable_term() {
        let mut config = CalculatorConfig::default();
        config.bounds.max_period_years = u32::MAX;

        match config.validate() {
            Err(ConfigError::Invalid(errors)) => assert_eq!(
                errors,
                vec![format!("Loan period cannot exceed {MAX_TERM_YEARS} years")]
            ),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_toml() {
        assert!(matches!(
            CalculatorConfig::from_toml_str("recommended_count = \"many\""),
            Err(ConfigError::ParseError(_))
        ));
    }
}
