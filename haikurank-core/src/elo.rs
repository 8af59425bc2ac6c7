/// ELO rating updates with an adaptive K-factor.
///
/// Expected score is the usual logistic curve on a 400-point scale. New items
/// move at `K_FACTOR_NEW` until they have `K_FACTOR_THRESHOLD` matches, then
/// settle to `K_FACTOR_ESTABLISHED`. Because the two sides can use different
/// K values, a single match is only zero-sum when both sides are in the same
/// K band.
use crate::constants::{K_FACTOR_ESTABLISHED, K_FACTOR_NEW, K_FACTOR_THRESHOLD};
use crate::types::{Dimension, DimensionScores, Item, Verdict};

/// Probability that an item rated `rating_a` beats one rated `rating_b`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// K-factor for an item that has played `matches` matches so far.
pub fn k_factor(matches: u32) -> f64 {
    if matches < K_FACTOR_THRESHOLD {
        K_FACTOR_NEW
    } else {
        K_FACTOR_ESTABLISHED
    }
}

/// Rounds half to even, so 3.125 becomes 3.12.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Apply one judged match to both items.
///
/// Must be called exactly once per judged pair: calling it twice records the
/// match twice.
pub fn apply_match(a: &mut Item, b: &mut Item, verdict: &Verdict, opponent_memory: usize) {
    let expected_a = expected_score(a.rating, b.rating);
    let expected_b = 1.0 - expected_a;
    let (score_a, score_b) = verdict.winner.scores();

    // K is taken from the pre-match count
    let k_a = k_factor(a.matches);
    let k_b = k_factor(b.matches);

    a.rating = round_to(a.rating + k_a * (score_a - expected_a), 1);
    b.rating = round_to(b.rating + k_b * (score_b - expected_b), 1);

    record_result(a, score_a, &b.id, opponent_memory);
    record_result(b, score_b, &a.id, opponent_memory);

    update_dim_averages(a, &verdict.a);
    update_dim_averages(b, &verdict.b);

    a.last_reasoning = Some(verdict.reasoning.clone());
    b.last_reasoning = Some(verdict.reasoning.clone());
}

fn record_result(item: &mut Item, score: f64, opponent_id: &str, opponent_memory: usize) {
    item.matches += 1;
    if score == 1.0 {
        item.wins += 1;
    } else if score == 0.0 {
        item.losses += 1;
    } else {
        item.draws += 1;
    }

    item.recent_opponents.push_front(opponent_id.to_string());
    item.recent_opponents.truncate(opponent_memory);
}

/// Fold one match's scores into the item's running means.
///
/// Uses the already-incremented match count as the sample size, so an item
/// whose averages were reset while it kept its match count weights the first
/// new score as if it were the n-th.
pub fn update_dim_averages(item: &mut Item, scores: &DimensionScores) {
    let n = f64::from(item.matches.max(1));
    for dim in Dimension::ALL {
        let value = f64::from(*scores.get(dim));
        let slot = item.dim_averages.get_mut(dim);
        let next = match *slot {
            None => value,
            Some(prev) => (prev * (n - 1.0) + value) / n,
        };
        *slot = Some(round_to(next, 2));
    }
}
