//! Amortization of a level-rate mortgage.
//!
//! Two repayment profiles are supported:
//! - **Equal installments (annuity)**: fixed total payment,
//!   `PMT = P * [r(1 + r)^n] / [(1 + r)^n – 1]`.
//! - **Decreasing installments**: fixed principal part `P / n`, interest on the
//!   outstanding balance, so payments fall over time.
//!
//! The monthly rate is the nominal one, `annual / 12 / 100`.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, CalculatorResult};
use crate::params::InstallmentType;

/// Headline figures of an amortized loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    /// Level payment, or the first (highest) installment for decreasing loans.
    pub monthly_payment: Decimal,
    /// Interest paid over the whole term.
    pub total_interest: Decimal,
    /// Principal plus interest paid over the whole term.
    pub total_cost: Decimal,
}

/// Represents the payment details for a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPayment {
    /// 1-based month number.
    pub month: u32,
    /// Total installment due this month.
    pub installment: Decimal,
    /// The portion of the payment that goes towards reducing the principal.
    pub current_amortization: Decimal,
    /// The portion of the payment that covers interest.
    pub current_interest: Decimal,
    /// The remaining balance of the loan after the payment.
    pub new_balance: Decimal,
}

/// Month-by-month repayment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub installment_type: InstallmentType,
    pub first_payment: Decimal,
    pub last_payment: Decimal,
    pub total_paid: Decimal,
    pub total_interest: Decimal,
    pub months: Vec<MonthPayment>,
}

/// Converts an annual percentage rate into a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(12) / dec!(100)
}

pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Longest term the calculator amortizes, in years.
pub const MAX_TERM_YEARS: u32 = 100;

fn too_large(field: &str) -> CalculatorError {
    CalculatorError::invalid(field, "too large to amortize")
}

/// Checks the inputs and returns the number of monthly installments.
fn validate_inputs(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
) -> CalculatorResult<u32> {
    if principal <= Decimal::ZERO {
        return Err(CalculatorError::invalid("principal", "must be positive"));
    }
    if term_years == 0 {
        return Err(CalculatorError::invalid("term_years", "must be positive"));
    }
    if term_years > MAX_TERM_YEARS {
        return Err(CalculatorError::invalid(
            "term_years",
            format!("cannot exceed {MAX_TERM_YEARS} years"),
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(CalculatorError::invalid("annual_rate", "cannot be negative"));
    }
    term_years
        .checked_mul(12)
        .ok_or_else(|| too_large("term_years"))
}

/// Unrounded level payment. `total_months` must be non-zero.
fn annuity_payment(
    principal: Decimal,
    rate: Decimal,
    total_months: u32,
) -> CalculatorResult<Decimal> {
    if rate.is_zero() {
        return principal
            .checked_div(Decimal::from(total_months))
            .ok_or_else(|| too_large("principal"));
    }

    // P * r * g / (g - 1) == P * r / (1 - 1/g), which keeps the product small
    // for long terms.
    let growth = (Decimal::ONE + rate)
        .checked_powu(total_months.into())
        .ok_or_else(|| too_large("annual_rate"))?;
    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(Decimal::ONE - Decimal::ONE / growth))
        .ok_or_else(|| too_large("principal"))
}

/// Computes the level monthly payment and lifetime totals of an annuity loan.
///
/// The payment is rounded to cents, and `total_cost` is exactly that payment
/// times the number of months.
///
/// # Errors
///
/// Returns [`CalculatorError::InvalidInput`] for a non-positive principal,
/// a zero or overlong term, a negative rate, or figures too large to
/// represent.
pub fn compute(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
) -> CalculatorResult<AmortizationResult> {
    let total_months = validate_inputs(principal, annual_rate_percent, term_years)?;

    let monthly_payment = round_money(annuity_payment(
        principal,
        monthly_rate(annual_rate_percent),
        total_months,
    )?);
    let total_cost = monthly_payment
        .checked_mul(Decimal::from(total_months))
        .ok_or_else(|| too_large("principal"))?;

    Ok(AmortizationResult {
        monthly_payment,
        total_interest: total_cost - principal,
        total_cost,
    })
}

/// Like [`compute`], for either repayment profile.
///
/// For decreasing installments `monthly_payment` is the first installment.
pub fn compute_for(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
    installment_type: InstallmentType,
) -> CalculatorResult<AmortizationResult> {
    match installment_type {
        InstallmentType::Equal => compute(principal, annual_rate_percent, term_years),
        InstallmentType::Decreasing => {
            let plan = schedule(principal, annual_rate_percent, term_years, installment_type)?;
            Ok(AmortizationResult {
                monthly_payment: plan.first_payment,
                total_interest: plan.total_interest,
                total_cost: plan.total_paid,
            })
        }
    }
}

/// Builds the full repayment plan.
pub fn schedule(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
    installment_type: InstallmentType,
) -> CalculatorResult<Schedule> {
    let total_months = validate_inputs(principal, annual_rate_percent, term_years)?;

    let rate = monthly_rate(annual_rate_percent);
    match installment_type {
        InstallmentType::Equal => equal_schedule(principal, rate, total_months),
        InstallmentType::Decreasing => decreasing_schedule(principal, rate, total_months),
    }
}

fn equal_schedule(
    principal: Decimal,
    rate: Decimal,
    total_months: u32,
) -> CalculatorResult<Schedule> {
    let fixed_payment = round_money(annuity_payment(principal, rate, total_months)?);

    let mut current_balance = principal;
    let mut months = Vec::with_capacity(total_months as usize);

    for month in 1..=total_months {
        let interest_payment = current_balance
            .checked_mul(rate)
            .ok_or_else(|| too_large("principal"))?;
        let amortization = fixed_payment - interest_payment;
        current_balance -= amortization;
        months.push(MonthPayment {
            month,
            installment: fixed_payment,
            current_amortization: amortization,
            current_interest: interest_payment,
            new_balance: current_balance.max(Decimal::ZERO),
        });
    }

    let total_paid = fixed_payment
        .checked_mul(Decimal::from(total_months))
        .ok_or_else(|| too_large("principal"))?;
    Ok(Schedule {
        installment_type: InstallmentType::Equal,
        first_payment: fixed_payment,
        last_payment: fixed_payment,
        total_paid,
        total_interest: total_paid - principal,
        months,
    })
}

fn decreasing_schedule(
    principal: Decimal,
    rate: Decimal,
    total_months: u32,
) -> CalculatorResult<Schedule> {
    let fixed_amortization = principal / Decimal::from(total_months);

    let mut current_balance = principal;
    let mut total_paid = Decimal::ZERO;
    let mut months = Vec::with_capacity(total_months as usize);

    for month in 1..=total_months {
        let current_payment = current_balance
            .checked_mul(rate)
            .and_then(|interest| fixed_amortization.checked_add(interest))
            .ok_or_else(|| too_large("principal"))?;
        let interest_payment = current_payment - fixed_amortization;
        current_balance -= fixed_amortization;
        total_paid = total_paid
            .checked_add(current_payment)
            .ok_or_else(|| too_large("principal"))?;
        months.push(MonthPayment {
            month,
            installment: current_payment,
            current_amortization: fixed_amortization,
            current_interest: interest_payment,
            new_balance: current_balance.max(Decimal::ZERO),
        });
    }

    let first_payment = months.first().map(|m| m.installment).unwrap_or_default();
    let last_payment = months.last().map(|m| m.installment).unwrap_or_default();
    let total_paid = round_money(total_paid);

    Ok(Schedule {
        installment_type: InstallmentType::Decreasing,
        first_payment: round_money(first_payment),
        last_payment: round_money(last_payment),
        total_paid,
        total_interest: total_paid - principal,
        months,
    })
}
