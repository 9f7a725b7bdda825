//! Cost of credit: effective rate, fees, premiums and RRSO.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{self, AmortizationResult, round_money};
use crate::bank::{BankOffer, InsuranceMode, LtvAdjustments};
use crate::config::RrsoMethod;
use crate::error::{CalculatorError, CalculatorResult};
use crate::params::{InterestRateType, LoanParameters};

/// Fees and rates of one offer on top of its amortization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub interest_rate: Decimal,
    pub commission: Decimal,
    /// Premiums over the whole term.
    pub insurance: Decimal,
    /// Account fees over the whole term.
    pub account_fees: Decimal,
    /// Installments plus commission, premiums and fees.
    pub total_cost: Decimal,
    pub rrso: Decimal,
}

/// Surcharge for the highest LTV band the loan falls into.
pub fn ltv_surcharge(adjustments: &LtvAdjustments, ltv_percent: Decimal) -> Decimal {
    if ltv_percent > dec!(95) {
        adjustments.ratio95
    } else if ltv_percent > dec!(90) {
        adjustments.ratio90
    } else if ltv_percent > dec!(80) {
        adjustments.ratio80
    } else {
        Decimal::ZERO
    }
}

/// Nominal annual rate (%) the bank charges for `rate_type` at this LTV.
///
/// # Errors
///
/// Returns [`CalculatorError::MissingBankField`] when the record lacks the
/// fixed rate, WIBOR or margin the rate type needs.
pub fn effective_rate(
    bank: &BankOffer,
    rate_type: InterestRateType,
    ltv_percent: Decimal,
) -> CalculatorResult<Decimal> {
    let base = match rate_type {
        InterestRateType::Fixed => bank
            .fixed_interest_rate
            .ok_or_else(|| CalculatorError::missing(&bank.id, "fixedInterestRate"))?,
        InterestRateType::Variable => {
            let wibor = bank
                .wibor
                .ok_or_else(|| CalculatorError::missing(&bank.id, "wibor"))?;
            let margin = bank
                .margin
                .ok_or_else(|| CalculatorError::missing(&bank.id, "margin"))?;
            wibor + margin
        }
    };
    Ok(base + ltv_surcharge(&bank.ltv_adjustments, ltv_percent))
}

/// Approximate RRSO: nominal rate plus the commission spread evenly over the
/// term, in percentage points per year.
///
/// This is not the IRR-exact figure; see [`irr_rrso`].
pub fn approximate_rrso(
    interest_rate: Decimal,
    commission: Decimal,
    loan_amount: Decimal,
    term_years: u32,
) -> Decimal {
    if loan_amount <= Decimal::ZERO || term_years == 0 {
        return interest_rate.round_dp(2);
    }
    let commission_pp = commission / loan_amount * dec!(100);
    (interest_rate + commission_pp / Decimal::from(term_years)).round_dp(2)
}

fn too_large() -> CalculatorError {
    CalculatorError::invalid("loan_amount", "too large to price")
}

/// Premium charged per installment or per year, depending on the mode.
fn insurance_premium(bank: &BankOffer, loan_amount: Decimal) -> CalculatorResult<Decimal> {
    loan_amount
        .checked_mul(bank.insurance_rate)
        .map(|premium| round_money(premium / dec!(100)))
        .ok_or_else(too_large)
}

/// Combines an amortized loan with the bank's fees.
pub fn aggregate(
    amortization: &AmortizationResult,
    bank: &BankOffer,
    params: &LoanParameters,
    interest_rate: Decimal,
    rrso_method: RrsoMethod,
) -> CalculatorResult<CostBreakdown> {
    let loan_amount = params.loan_amount;
    let total_months = Decimal::from(params.total_months()?);

    let commission = loan_amount
        .checked_mul(bank.commission_rate)
        .map(|commission| round_money(commission / dec!(100)))
        .ok_or_else(too_large)?;
    let premium = insurance_premium(bank, loan_amount)?;
    let insurance = match bank.insurance_mode {
        InsuranceMode::Monthly => premium.checked_mul(total_months),
        InsuranceMode::Annual => premium.checked_mul(Decimal::from(params.loan_period_years)),
    }
    .ok_or_else(too_large)?;
    let account_fees = bank
        .account_fee_monthly
        .unwrap_or_default()
        .checked_mul(total_months)
        .ok_or_else(too_large)?;
    let total_cost = [commission, insurance, account_fees]
        .into_iter()
        .try_fold(amortization.total_cost, Decimal::checked_add)
        .ok_or_else(too_large)?;

    let rrso = match rrso_method {
        RrsoMethod::Approximate => {
            approximate_rrso(interest_rate, commission, loan_amount, params.loan_period_years)
        }
        RrsoMethod::Irr => irr_rrso(bank, params, interest_rate, commission)?,
    };

    Ok(CostBreakdown {
        interest_rate,
        commission,
        insurance,
        account_fees,
        total_cost,
        rrso,
    })
}

/// RRSO as the annualized internal rate of return of the borrower's cash flows:
/// the loan net of commission (and the first annual premium) received up front,
/// then every installment, premium and account fee paid.
pub fn irr_rrso(
    bank: &BankOffer,
    params: &LoanParameters,
    interest_rate: Decimal,
    commission: Decimal,
) -> CalculatorResult<Decimal> {
    let plan = amortization::schedule(
        params.loan_amount,
        interest_rate,
        params.loan_period_years,
        params.installment_type,
    )?;
    let premium = insurance_premium(bank, params.loan_amount)?;
    let account_fee = bank.account_fee_monthly.unwrap_or_default();
    let total_months = params.total_months()?;

    let mut cashflows = Vec::with_capacity(plan.months.len() + 1);
    let mut disbursed = params.loan_amount - commission;
    if bank.insurance_mode == InsuranceMode::Annual {
        disbursed -= premium;
    }
    cashflows.push(disbursed);
    for month in &plan.months {
        let mut outflow = month.installment + account_fee;
        match bank.insurance_mode {
            InsuranceMode::Monthly => outflow += premium,
            InsuranceMode::Annual if month.month % 12 == 0 && month.month < total_months => {
                outflow += premium
            }
            InsuranceMode::Annual => {}
        }
        cashflows.push(-outflow);
    }

    let guess = amortization::monthly_rate(interest_rate);
    let monthly = monthly_irr(&cashflows, guess).ok_or_else(|| {
        CalculatorError::invalid("rrso", format!("no internal rate of return for bank {}", bank.id))
    })?;
    let annual = (Decimal::ONE + monthly)
        .checked_powu(12)
        .ok_or_else(|| CalculatorError::invalid("rrso", "internal rate of return overflowed"))?;
    Ok(((annual - Decimal::ONE) * dec!(100)).round_dp(2))
}

const IRR_TOLERANCE: Decimal = dec!(0.000000000001);
const IRR_MAX_ITERATIONS: usize = 100;

/// Periodic IRR via Newton-Raphson, falling back to bisection on `[0, 1]`.
fn monthly_irr(cashflows: &[Decimal], guess: Decimal) -> Option<Decimal> {
    if cashflows.len() < 2 {
        return None;
    }
    if npv(cashflows, Decimal::ZERO).is_zero() {
        return Some(Decimal::ZERO);
    }

    let mut rate = guess.max(dec!(0.0001));
    for _ in 0..IRR_MAX_ITERATIONS {
        let (value, derivative) = npv_and_derivative(cashflows, rate);
        if derivative.is_zero() {
            break;
        }
        let next = rate - value / derivative;
        if next <= dec!(-0.99) || next > Decimal::ONE {
            break;
        }
        if (next - rate).abs() < IRR_TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    irr_bisection(cashflows)
}

fn irr_bisection(cashflows: &[Decimal]) -> Option<Decimal> {
    let mut low = Decimal::ZERO;
    let mut high = Decimal::ONE;
    let mut npv_low = npv(cashflows, low);
    if npv_low * npv(cashflows, high) > Decimal::ZERO {
        return None;
    }

    for _ in 0..200 {
        let mid = (low + high) / dec!(2);
        let npv_mid = npv(cashflows, mid);
        if npv_mid.abs() < IRR_TOLERANCE || (high - low) < IRR_TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv_low < Decimal::ZERO {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }
    Some((low + high) / dec!(2))
}

fn npv(cashflows: &[Decimal], rate: Decimal) -> Decimal {
    let discount = Decimal::ONE / (Decimal::ONE + rate);
    let mut factor = Decimal::ONE;
    let mut total = Decimal::ZERO;
    for cf in cashflows {
        total += cf * factor;
        factor *= discount;
    }
    total
}

/// NPV and its derivative with respect to the periodic rate.
fn npv_and_derivative(cashflows: &[Decimal], rate: Decimal) -> (Decimal, Decimal) {
    let discount = Decimal::ONE / (Decimal::ONE + rate);
    let mut factor = Decimal::ONE;
    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;
    for (t, cf) in cashflows.iter().enumerate() {
        value += cf * factor;
        derivative -= Decimal::from(t) * cf * factor * discount;
        factor *= discount;
    }
    (value, derivative)
}
