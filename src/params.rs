//! Loan parameters entered by the user.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::ParameterBounds;
use crate::error::{CalculatorError, CalculatorResult};

/// What the mortgage is taken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Purchase,
    Refinancing,
    Construction,
}

/// How the interest rate of an offer is composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestRateType {
    /// Rate fixed for the whole term.
    Fixed,
    /// WIBOR plus the bank margin.
    #[default]
    Variable,
}

/// Repayment profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentType {
    /// Level payments (annuity).
    #[default]
    Equal,
    /// Constant principal part, falling interest part.
    Decreasing,
}

/// Input parameters for an offer comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParameters {
    /// Amount borrowed.
    pub loan_amount: Decimal,
    /// Term in whole years.
    pub loan_period_years: u32,
    /// Own contribution towards the property.
    pub down_payment: Decimal,
    /// Net monthly income of the borrowers.
    pub monthly_income: Decimal,
    pub purpose: LoanPurpose,
    #[serde(default)]
    pub interest_rate_type: InterestRateType,
    #[serde(default)]
    pub installment_type: InstallmentType,
    /// Collateral value. Defaults to `loan_amount + down_payment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Decimal>,
}

impl LoanParameters {
    /// A purchase with no down payment, variable rate and equal installments.
    pub fn new(loan_amount: Decimal, loan_period_years: u32, monthly_income: Decimal) -> Self {
        Self {
            loan_amount,
            loan_period_years,
            down_payment: Decimal::ZERO,
            monthly_income,
            purpose: LoanPurpose::Purchase,
            interest_rate_type: InterestRateType::Variable,
            installment_type: InstallmentType::Equal,
            property_value: None,
        }
    }

    pub fn with_down_payment(mut self, down_payment: Decimal) -> Self {
        self.down_payment = down_payment;
        self
    }

    pub fn with_purpose(mut self, purpose: LoanPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_interest_rate_type(mut self, interest_rate_type: InterestRateType) -> Self {
        self.interest_rate_type = interest_rate_type;
        self
    }

    pub fn with_installment_type(mut self, installment_type: InstallmentType) -> Self {
        self.installment_type = installment_type;
        self
    }

    pub fn with_property_value(mut self, property_value: Decimal) -> Self {
        self.property_value = Some(property_value);
        self
    }

    /// Number of monthly installments over the requested period.
    pub fn total_months(&self) -> CalculatorResult<u32> {
        self.loan_period_years
            .checked_mul(12)
            .ok_or_else(|| CalculatorError::invalid("loan_period_years", "too long to amortize"))
    }

    pub fn property_value(&self) -> Decimal {
        self.property_value
            .unwrap_or(self.loan_amount + self.down_payment)
    }

    /// Loan-to-value in percent. Zero when the property value is not positive.
    pub fn ltv_percent(&self) -> Decimal {
        let property_value = self.property_value();
        if property_value <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.loan_amount / property_value * dec!(100)
    }

    /// Down payment as a percentage of the property value.
    pub fn down_payment_percent(&self) -> Decimal {
        let property_value = self.property_value();
        if property_value <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.down_payment / property_value * dec!(100)
    }

    /// Checks the parameters the way the calculator form does before
    /// running a comparison.
    pub fn validate(&self, bounds: &ParameterBounds) -> CalculatorResult<()> {
        if self.loan_amount <= Decimal::ZERO {
            return Err(CalculatorError::invalid("loan_amount", "must be positive"));
        }
        if self.loan_amount < bounds.min_loan_amount || self.loan_amount > bounds.max_loan_amount {
            return Err(CalculatorError::invalid(
                "loan_amount",
                format!(
                    "must be between {} and {}",
                    bounds.min_loan_amount, bounds.max_loan_amount
                ),
            ));
        }
        if self.loan_period_years < bounds.min_period_years
            || self.loan_period_years > bounds.max_period_years
        {
            return Err(CalculatorError::invalid(
                "loan_period_years",
                format!(
                    "must be between {} and {} years",
                    bounds.min_period_years, bounds.max_period_years
                ),
            ));
        }
        if self.down_payment < Decimal::ZERO {
            return Err(CalculatorError::invalid("down_payment", "cannot be negative"));
        }
        if self.monthly_income <= Decimal::ZERO {
            return Err(CalculatorError::invalid("monthly_income", "must be positive"));
        }
        if let Some(property_value) = self.property_value {
            if property_value < self.loan_amount {
                return Err(CalculatorError::invalid(
                    "property_value",
                    "cannot be lower than the loan amount",
                ));
            }
            if self.down_payment > property_value {
                return Err(CalculatorError::invalid(
                    "down_payment",
                    "cannot exceed the property value",
                ));
            }
        }
        Ok(())
    }
}
