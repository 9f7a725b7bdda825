use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::params::{InstallmentType, InterestRateType};

/// One bank's offer computed for one set of loan parameters.
///
/// Results are created by the pipeline and only read afterwards; `score`
/// and `is_recommended` are filled in when the set is ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub bank_id: String,
    pub bank_name: String,
    /// Position of the bank in its catalog; breaks score ties.
    pub catalog_index: usize,
    pub interest_rate_type: InterestRateType,
    pub installment_type: InstallmentType,
    pub monthly_payment: Decimal,
    /// Total cost of credit: installments plus every fee and premium.
    pub total_cost: Decimal,
    pub total_interest: Decimal,
    pub commission: Decimal,
    /// Insurance premiums over the whole term.
    pub insurance: Decimal,
    /// Account fees over the whole term.
    pub account_fees: Decimal,
    /// Effective nominal rate (%) after the LTV surcharge.
    pub interest_rate: Decimal,
    pub rrso: Decimal,
    pub ltv_percent: Decimal,
    /// Advantages minus disadvantages listed by the bank.
    pub net_advantages: i64,
    pub score: u8,
    pub is_recommended: bool,
}
