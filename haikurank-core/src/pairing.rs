/// Pair selection for rating sessions.
///
/// Items with fewer matches are drawn more often so the whole corpus converges
/// toward the same sample count. Each pair is two independent weighted draws;
/// a draw is thrown away when both sides land on the same item or when B is in
/// A's recent-opponent window.
use rand::Rng;

use crate::constants::PAIR_ATTEMPT_MULTIPLIER;
use crate::error::InsufficientPairs;
use crate::types::{IndexedPair, Item};

/// Result of one call to `select_pairs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSelection {
    pub pairs: Vec<IndexedPair>,
    pub requested: usize,
    pub attempts: usize,
}

impl PairSelection {
    /// `Some` when fewer pairs were found than requested.
    pub fn shortfall(&self) -> Option<InsufficientPairs> {
        (self.pairs.len() < self.requested).then_some(InsufficientPairs {
            requested: self.requested,
            found: self.pairs.len(),
        })
    }
}

/// Selection weight per item: `max_matches - matches + 1`.
///
/// The least-played item gets the largest weight; the most-played gets 1, so
/// nobody is ever excluded outright.
pub fn selection_weights(items: &[Item]) -> Vec<f64> {
    let max_matches = items.iter().map(|i| i.matches).max().unwrap_or(0);
    items
        .iter()
        .map(|i| f64::from(max_matches - i.matches + 1))
        .collect()
}

/// Select up to `n` ordered pairs `(A, B)` of positions into `items`.
///
/// Gives up after `PAIR_ATTEMPT_MULTIPLIER * n` draws; check
/// `PairSelection::shortfall` for a partial result. The same pair can appear
/// more than once in one selection because opponent memory only changes when a
/// match is recorded.
pub fn select_pairs(items: &[Item], n: usize, rng: &mut impl Rng) -> PairSelection {
    let mut selection = PairSelection {
        pairs: Vec::with_capacity(n),
        requested: n,
        attempts: 0,
    };

    if items.len() < 2 {
        return selection;
    }

    let weights = selection_weights(items);
    let total_weight: f64 = weights.iter().sum();
    let max_attempts = n * PAIR_ATTEMPT_MULTIPLIER;

    while selection.pairs.len() < n && selection.attempts < max_attempts {
        selection.attempts += 1;

        let a = weighted_random_select(&weights, total_weight, rng);
        let b = weighted_random_select(&weights, total_weight, rng);
        if a == b {
            continue;
        }
        if items[a].has_recently_played(&items[b].id) {
            continue;
        }

        selection.pairs.push((a, b));
    }

    selection
}

fn weighted_random_select(weights: &[f64], total_weight: f64, rng: &mut impl Rng) -> usize {
    let mut r = rng.random::<f64>() * total_weight;
    for (j, &w) in weights.iter().enumerate() {
        r -= w;
        if r < 1e-10 {
            return j;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("p{i}"), vec![format!("line {i}")], Source::Human))
            .collect()
    }

    fn with_matches(mut item: Item, matches: u32) -> Item {
        item.matches = matches;
        item.wins = matches;
        item
    }

    #[test]
    fn test_weights_favor_fewer_matches() {
        let items = vec![
            with_matches(Item::new("a", vec![], Source::Ai), 0),
            with_matches(Item::new("b", vec![], Source::Ai), 4),
            with_matches(Item::new("c", vec![], Source::Human), 10),
        ];
        assert_eq!(selection_weights(&items), vec![11.0, 7.0, 1.0]);
        assert_eq!(selection_weights(&corpus(3)), vec![1.0, 1.0, 1.0]);
        assert!(selection_weights(&[]).is_empty());
    }

    #[test]
    fn test_too_small_corpus_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in 0..2 {
            let selection = select_pairs(&corpus(size), 5, &mut rng);
            assert!(selection.pairs.is_empty());
            assert_eq!(selection.attempts, 0);
            assert_eq!(selection.shortfall(), Some(InsufficientPairs { requested: 5, found: 0 }));
        }
    }

    #[test]
    fn test_never_pairs_item_with_itself() {
        let items = corpus(4);
        let mut rng = StdRng::seed_from_u64(42);
        let selection = select_pairs(&items, 200, &mut rng);
        assert_eq!(selection.pairs.len(), 200);
        assert!(selection.shortfall().is_none());
        for &(a, b) in &selection.pairs {
            assert_ne!(a, b);
            assert_ne!(items[a].id, items[b].id);
        }
    }

    #[test]
    fn test_skips_recent_opponents() {
        let mut items = corpus(5);
        // p0 has just played p1 and p2
        items[0].recent_opponents.push_front("p1".into());
        items[0].recent_opponents.push_front("p2".into());

        let mut rng = StdRng::seed_from_u64(3);
        let selection = select_pairs(&items, 300, &mut rng);
        assert!(!selection.pairs.is_empty());
        for &(a, b) in &selection.pairs {
            assert!(!items[a].has_recently_played(&items[b].id), "{a} vs {b}");
        }
    }

    #[test]
    fn test_exhausted_budget_returns_partial() {
        let mut items = corpus(3);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    let opp = items[j].id.clone();
                    items[i].recent_opponents.push_front(opp);
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(11);
        let selection = select_pairs(&items, 4, &mut rng);
        assert!(selection.pairs.is_empty());
        assert_eq!(selection.attempts, 4 * PAIR_ATTEMPT_MULTIPLIER);
        assert_eq!(selection.shortfall(), Some(InsufficientPairs { requested: 4, found: 0 }));
    }

    #[test]
    fn test_under_sampled_items_drawn_more() {
        let mut items = corpus(6);
        for item in items.iter_mut().skip(1) {
            *item = with_matches(item.clone(), 30);
        }

        let mut rng = StdRng::seed_from_u64(1234);
        let selection = select_pairs(&items, 500, &mut rng);
        let fresh = selection
            .pairs
            .iter()
            .filter(|&&(a, b)| a == 0 || b == 0)
            .count();
        // p0 carries 31 of 36 weight units, so it shows up in nearly every pair
        assert!(fresh > 400, "fresh item appeared in only {fresh} pairs");
    }

    #[test]
    fn test_zero_requested() {
        let mut rng = StdRng::seed_from_u64(0);
        let selection = select_pairs(&corpus(10), 0, &mut rng);
        assert!(selection.pairs.is_empty());
        assert!(selection.shortfall().is_none());
    }
}
