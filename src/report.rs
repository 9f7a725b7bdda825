//! How an offer compares with the rest of the set.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::result::CalculationResult;
use crate::scoring::rank_order;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Relative to the set mean; negative means cheaper than average.
    pub monthly_payment_delta_percent: Decimal,
    pub total_cost_delta_percent: Decimal,
}

/// Headline figures of a whole comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSummary {
    pub offer_count: usize,
    pub mean_monthly_payment: Decimal,
    pub mean_total_cost: Decimal,
    pub min_monthly_payment: Decimal,
    pub max_monthly_payment: Decimal,
    pub best_offer_id: String,
}

fn mean<I: ExactSizeIterator<Item = Decimal>>(values: I) -> Decimal {
    let count = values.len();
    if count == 0 {
        return Decimal::ZERO;
    }
    values.sum::<Decimal>() / Decimal::from(count)
}

fn delta_percent(value: Decimal, mean: Decimal) -> Decimal {
    if mean.is_zero() {
        return Decimal::ZERO;
    }
    ((value - mean) / mean * dec!(100)).round_dp(2)
}

/// Rank and mean-relative deltas of `result` within `all_results`.
///
/// The rank counts the offers that order ahead of `result`, so it does not
/// depend on how `all_results` happens to be sorted.
pub fn compare(result: &CalculationResult, all_results: &[CalculationResult]) -> Comparison {
    let ahead = all_results
        .iter()
        .filter(|other| other.bank_id != result.bank_id)
        .filter(|other| rank_order(other, result).is_lt())
        .count();

    let mean_payment = mean(all_results.iter().map(|r| r.monthly_payment));
    let mean_cost = mean(all_results.iter().map(|r| r.total_cost));

    Comparison {
        rank: ahead + 1,
        monthly_payment_delta_percent: delta_percent(result.monthly_payment, mean_payment),
        total_cost_delta_percent: delta_percent(result.total_cost, mean_cost),
    }
}

/// `None` for an empty set.
pub fn summarize(all_results: &[CalculationResult]) -> Option<SetSummary> {
    let best = all_results.iter().min_by(|a, b| rank_order(a, b))?;
    let min_monthly_payment = all_results.iter().map(|r| r.monthly_payment).min()?;
    let max_monthly_payment = all_results.iter().map(|r| r.monthly_payment).max()?;

    Some(SetSummary {
        offer_count: all_results.len(),
        mean_monthly_payment: mean(all_results.iter().map(|r| r.monthly_payment)).round_dp(2),
        mean_total_cost: mean(all_results.iter().map(|r| r.total_cost)).round_dp(2),
        min_monthly_payment,
        max_monthly_payment,
        best_offer_id: best.bank_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculatorConfig;
    use crate::scoring::rank;
    use crate::scoring::test_support::result;

    fn ranked() -> Vec<CalculationResult> {
        rank(
            vec![
                result("a", 0, dec!(3000), dec!(900000), dec!(7.5)),
                result("b", 1, dec!(2800), dec!(840000), dec!(7.0)),
                result("c", 2, dec!(3400), dec!(960000), dec!(8.0)),
            ],
            &CalculatorConfig::default(),
        )
    }

    #[test]
    fn test_compare_against_mean() {
        let all = ranked();
        let a = all.iter().find(|r| r.bank_id == "a").unwrap();
        let comparison = compare(a, &all);
        assert_eq!(comparison.rank, 2);
        // mean payment 3066.67, mean cost 900000
        assert_eq!(comparison.monthly_payment_delta_percent, dec!(-2.17));
        assert_eq!(comparison.total_cost_delta_percent, Decimal::ZERO);
    }

    #[test]
    fn test_rank_ignores_input_order() {
        let mut all = ranked();
        all.reverse();
        let ranks: Vec<usize> = ["b", "a", "c"]
            .iter()
            .map(|id| compare(all.iter().find(|r| r.bank_id == *id).unwrap(), &all).rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_tied_scores_rank_by_catalog_order() {
        let all = rank(
            vec![
                result("first", 0, dec!(3000), dec!(900000), dec!(7.5)),
                result("second", 1, dec!(3000), dec!(900000), dec!(7.5)),
            ],
            &CalculatorConfig::default(),
        );
        assert_eq!(compare(&all[0], &all).rank, 1);
        assert_eq!(compare(&all[1], &all).rank, 2);
        assert_eq!(all[1].bank_id, "second");
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&ranked()).unwrap();
        assert_eq!(summary.offer_count, 3);
        assert_eq!(summary.mean_monthly_payment, dec!(3066.67));
        assert_eq!(summary.mean_total_cost, dec!(900000));
        assert_eq!(summary.min_monthly_payment, dec!(2800));
        assert_eq!(summary.max_monthly_payment, dec!(3400));
        assert_eq!(summary.best_offer_id, "b");
        assert_eq!(summarize(&[]), None);
    }
}
