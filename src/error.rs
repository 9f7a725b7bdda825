use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while computing a single offer.
///
/// Neither variant is fatal for a whole comparison: the pipeline turns a
/// per-bank error into an exclusion and keeps ranking the remaining offers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorError {
    #[error("Invalid value for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Bank {bank_id} is missing {field}")]
    MissingBankField { bank_id: String, field: String },
}

impl CalculatorError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        CalculatorError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(bank_id: &str, field: &str) -> Self {
        CalculatorError::MissingBankField {
            bank_id: bank_id.to_string(),
            field: field.to_string(),
        }
    }
}

/// Errors found while validating a bank catalog at load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Duplicate bank id: {0}")]
    DuplicateId(String),

    #[error("Invalid value for {field} in bank {bank_id}: {message}")]
    InvalidRecord {
        bank_id: String,
        field: String,
        message: String,
    },
}

/// Errors found while loading or validating a [`crate::CalculatorConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub type CalculatorResult<T> = Result<T, CalculatorError>;
