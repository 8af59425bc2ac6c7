/// In-memory rating store.
///
/// Single owner of the corpus for the length of a session. Items keep their
/// load order; ids are mapped to positions the same way for the lifetime of
/// the store because items are never added or removed here.
use std::collections::HashMap;

use crate::elo::apply_match;
use crate::error::CorpusError;
use crate::types::{IndexedPair, Item, Verdict};

#[derive(Debug, Clone)]
pub struct RatingStore {
    items: Vec<Item>,
    id_to_idx: HashMap<String, usize>,
    opponent_memory: usize,
}

impl RatingStore {
    /// Build a store, checking the invariants every persisted item must satisfy.
    pub fn new(items: Vec<Item>, opponent_memory: usize) -> Result<Self, CorpusError> {
        let mut id_to_idx = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if id_to_idx.insert(item.id.clone(), idx).is_some() {
                return Err(CorpusError::DuplicateId { id: item.id.clone() });
            }
            let recorded = item.wins + item.losses + item.draws;
            if item.matches != recorded {
                return Err(CorpusError::CounterMismatch {
                    id: item.id.clone(),
                    matches: item.matches,
                    recorded,
                });
            }
            if !item.rating.is_finite() {
                return Err(CorpusError::NonFiniteRating {
                    id: item.id.clone(),
                    rating: item.rating,
                });
            }
        }

        Ok(RatingStore {
            items,
            id_to_idx,
            opponent_memory,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn opponent_memory(&self) -> usize {
        self.opponent_memory
    }

    pub fn get(&self, idx: usize) -> Option<&Item> {
        self.items.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Result<usize, CorpusError> {
        self.id_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| CorpusError::UnknownId { id: id.to_string() })
    }

    pub fn by_id(&self, id: &str) -> Option<&Item> {
        self.id_to_idx.get(id).map(|&idx| &self.items[idx])
    }

    /// Apply one judged match to the items at `pair`.
    ///
    /// Panics if the two positions are equal or out of range; pairs come from
    /// the selector, which never produces either.
    pub fn record_match(&mut self, pair: IndexedPair, verdict: &Verdict) {
        let (a, b) = pair_mut(&mut self.items, pair);
        apply_match(a, b, verdict, self.opponent_memory);
    }
}

/// Borrow two distinct items mutably.
fn pair_mut(items: &mut [Item], (a, b): IndexedPair) -> (&mut Item, &mut Item) {
    assert!(a != b, "cannot pair item {} with itself", a);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
