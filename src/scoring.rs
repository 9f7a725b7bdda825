//! Composite 0-100 score and ranking of offers.
//!
//! Each metric is min-max normalized across the candidate set so the cheapest
//! offer gets full marks and the most expensive none. The weighted mean of the
//! normalized metrics, scaled to 100, is the score.

use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::config::{CalculatorConfig, ScoringWeights};
use crate::result::CalculationResult;

/// `(max - value) / (max - min)`; full marks when the set does not vary.
fn lower_is_better(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    if max == min {
        return Decimal::ONE;
    }
    (max - value) / (max - min)
}

fn bounds<I: IntoIterator<Item = Decimal>>(values: I) -> Option<(Decimal, Decimal)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Score of `result` against every candidate in `all_results`.
///
/// `all_results` is expected to contain `result`; when it is empty the
/// result is scored against itself.
pub fn score(
    result: &CalculationResult,
    all_results: &[CalculationResult],
    weights: &ScoringWeights,
) -> u8 {
    let total_weight = weights.total();
    if total_weight <= Decimal::ZERO {
        return 0;
    }

    let set = if all_results.is_empty() {
        std::slice::from_ref(result)
    } else {
        all_results
    };
    let metric = |get: fn(&CalculationResult) -> Decimal| {
        let (min, max) = bounds(set.iter().map(get)).unwrap_or((get(result), get(result)));
        lower_is_better(get(result), min, max)
    };

    let payment = metric(|r| r.monthly_payment);
    let total_cost = metric(|r| r.total_cost);
    let rrso = metric(|r| r.rrso);
    // Negated so that more net advantages rank higher.
    let qualitative = metric(|r| -Decimal::from(r.net_advantages));

    let weighted = weights.monthly_payment * payment
        + weights.total_cost * total_cost
        + weights.rrso * rrso
        + weights.qualitative * qualitative;

    (weighted / total_weight * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, dec!(100))
        .to_u8()
        .unwrap_or_default()
}

/// Ranking order: higher score first, catalog order on ties.
pub fn rank_order(a: &CalculationResult, b: &CalculationResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.catalog_index.cmp(&b.catalog_index))
}

/// Scores every result, sorts them best first and flags the top
/// `config.recommended_count` as recommended.
pub fn rank(
    mut results: Vec<CalculationResult>,
    config: &CalculatorConfig,
) -> Vec<CalculationResult> {
    let scores: Vec<u8> = results
        .iter()
        .map(|result| score(result, &results, &config.scoring))
        .collect();
    for (result, score) in results.iter_mut().zip(scores) {
        result.score = score;
    }

    results.sort_by(rank_order);
    for (position, result) in results.iter_mut().enumerate() {
        result.is_recommended = position < config.recommended_count;
    }
    results
}


#[cfg(test)]
mod tests {
    use super::test_support::result;
    use super::*;
    use crate::bank::test_support::bank;
    use crate::pipeline::calculate_offer;
    use crate::params::LoanParameters;

    fn candidates() -> Vec<CalculationResult> {
        vec![
            result("mid", 0, dec!(3000), dec!(900000), dec!(7.5)),
            result("cheap", 1, dec!(2800), dec!(850000), dec!(7.0)),
            result("dear", 2, dec!(3300), dec!(990000), dec!(8.4)),
            result("cheap-twin", 3, dec!(2800), dec!(850000), dec!(7.0)),
        ]
    }

    #[test]
    fn test_best_and_worst_hit_the_bounds() {
        let all = candidates();
        let weights = ScoringWeights::default();
        assert_eq!(score(&all[1], &all, &weights), 100);
        assert_eq!(score(&all[2], &all, &weights), 0);
    }

    #[test]
    fn test_weighted_mean_of_normalized_metrics() {
        let all = candidates();
        // payment (3300-3000)/500 = 0.6, cost 90000/140000, rrso 0.9/1.4
        // 0.4 * 0.6 + 0.35 * 0.642857 + 0.25 * 0.642857 = 0.625714
        assert_eq!(score(&all[0], &all, &ScoringWeights::default()), 63);
    }

    #[test]
    fn test_single_offer_gets_full_marks() {
        let only = result("only", 0, dec!(3000), dec!(900000), dec!(7.5));
        assert_eq!(score(&only, &[], &ScoringWeights::default()), 100);
        assert_eq!(score(&only, std::slice::from_ref(&only), &ScoringWeights::default()), 100);
    }

    #[test]
    fn test_qualitative_weight_rewards_net_advantages() {
        let mut all = vec![
            result("a", 0, dec!(3000), dec!(900000), dec!(7.5)),
            result("b", 1, dec!(3000), dec!(900000), dec!(7.5)),
        ];
        all[1].net_advantages = 3;
        let weights = ScoringWeights {
            qualitative: dec!(20),
            ..ScoringWeights::default()
        };
        assert!(score(&all[1], &all, &weights) > score(&all[0], &all, &weights));
        assert_eq!(score(&all[1], &all, &weights), 100);
    }

    #[test]
    fn test_rank_sorts_stably_and_recommends_top_three() {
        let ranked = rank(candidates(), &CalculatorConfig::default());
        let order: Vec<&str> = ranked.iter().map(|r| r.bank_id.as_str()).collect();
        assert_eq!(order, vec!["cheap", "cheap-twin", "mid", "dear"]);
        let recommended: Vec<bool> = ranked.iter().map(|r| r.is_recommended).collect();
        assert_eq!(recommended, vec![true, true, true, false]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let config = CalculatorConfig::default();
        let once = rank(candidates(), &config);
        let twice = rank(once.clone(), &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lower_commission_scores_at_least_as_high() {
        let params =
            LoanParameters::new(dec!(400000), 25, dec!(15000)).with_down_payment(dec!(100000));
        let config = CalculatorConfig::default();
        let mut low = bank("low");
        low.commission_rate = dec!(0.5);
        let mut high = bank("high");
        high.commission_rate = dec!(2.5);

        let results = vec![
            calculate_offer(&params, &high, 0, &config).unwrap(),
            calculate_offer(&params, &low, 1, &config).unwrap(),
        ];
        let ranked = rank(results, &config);

        let low_score = ranked.iter().find(|r| r.bank_id == "low").unwrap().score;
        let high_score = ranked.iter().find(|r| r.bank_id == "high").unwrap().score;
        assert!(low_score >= high_score);
        assert_eq!(ranked[0].bank_id, "low");
    }
}
