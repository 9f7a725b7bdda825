//! Checks whether a bank lends on the requested terms at all.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bank::BankOffer;
use crate::params::{InterestRateType, LoanParameters, LoanPurpose};

/// Why a bank does not make an offer for the requested loan.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligibility {
    #[error("loan amount below the bank minimum of {min}")]
    LoanAmountBelowMinimum { min: Decimal },

    #[error("loan amount above the bank maximum of {max}")]
    LoanAmountAboveMaximum { max: Decimal },

    #[error("loan period outside {min}-{max} years")]
    PeriodOutOfRange { min: u32, max: u32 },

    #[error("down payment below the required {required_percent}%")]
    DownPaymentTooLow { required_percent: Decimal },

    #[error("purpose {purpose:?} not financed")]
    PurposeNotSupported { purpose: LoanPurpose },

    #[error("{rate_type:?} rate not offered")]
    RateTypeNotSupported { rate_type: InterestRateType },
}

/// Every reason the bank turns the request down. Empty when eligible.
pub fn check_eligibility(bank: &BankOffer, params: &LoanParameters) -> Vec<Ineligibility> {
    let mut reasons = Vec::new();

    if params.loan_amount < bank.min_loan_amount {
        reasons.push(Ineligibility::LoanAmountBelowMinimum {
            min: bank.min_loan_amount,
        });
    }
    if params.loan_amount > bank.max_loan_amount {
        reasons.push(Ineligibility::LoanAmountAboveMaximum {
            max: bank.max_loan_amount,
        });
    }
    if params.loan_period_years < bank.min_loan_period
        || params.loan_period_years > bank.max_loan_period
    {
        reasons.push(Ineligibility::PeriodOutOfRange {
            min: bank.min_loan_period,
            max: bank.max_loan_period,
        });
    }
    if bank.min_down_payment_percent > Decimal::ZERO
        && params.down_payment_percent() < bank.min_down_payment_percent
    {
        reasons.push(Ineligibility::DownPaymentTooLow {
            required_percent: bank.min_down_payment_percent,
        });
    }
    if !bank.supported_purposes.contains(&params.purpose) {
        reasons.push(Ineligibility::PurposeNotSupported {
            purpose: params.purpose,
        });
    }
    if !bank.supports_rate_type(params.interest_rate_type) {
        reasons.push(Ineligibility::RateTypeNotSupported {
            rate_type: params.interest_rate_type,
        });
    }

    reasons
}
