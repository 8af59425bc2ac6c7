use std::collections::VecDeque;
use std::fmt;

use crate::constants::BASELINE_RATING;

/// Where a poem came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Source {
    Human,
    Ai,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Human, Source::Ai];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Human => "human",
            Source::Ai => "ai",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The six literary axes the judge scores on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    ImagePrecision,
    Cut,
    Economy,
    Resonance,
    Originality,
    Musicality,
}

impl Dimension {
    /// All dimensions, in the order they are presented to the judge.
    pub const ALL: [Dimension; 6] = [
        Dimension::ImagePrecision,
        Dimension::Cut,
        Dimension::Economy,
        Dimension::Resonance,
        Dimension::Originality,
        Dimension::Musicality,
    ];

    /// Key used for this dimension in judge responses and the corpus file.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::ImagePrecision => "image_precision",
            Dimension::Cut => "cut",
            Dimension::Economy => "economy",
            Dimension::Resonance => "resonance",
            Dimension::Originality => "originality",
            Dimension::Musicality => "musicality",
        }
    }

    pub fn from_key(key: &str) -> Option<Dimension> {
        Dimension::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// One value per dimension. Serializes as an object keyed by `Dimension::key`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionMap<T> {
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_precision: T,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cut: T,
    #[cfg_attr(feature = "serde", serde(default))]
    pub economy: T,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resonance: T,
    #[cfg_attr(feature = "serde", serde(default))]
    pub originality: T,
    #[cfg_attr(feature = "serde", serde(default))]
    pub musicality: T,
}

impl<T> DimensionMap<T> {
    pub fn from_fn(mut f: impl FnMut(Dimension) -> T) -> Self {
        DimensionMap {
            image_precision: f(Dimension::ImagePrecision),
            cut: f(Dimension::Cut),
            economy: f(Dimension::Economy),
            resonance: f(Dimension::Resonance),
            originality: f(Dimension::Originality),
            musicality: f(Dimension::Musicality),
        }
    }

    pub fn get(&self, dim: Dimension) -> &T {
        match dim {
            Dimension::ImagePrecision => &self.image_precision,
            Dimension::Cut => &self.cut,
            Dimension::Economy => &self.economy,
            Dimension::Resonance => &self.resonance,
            Dimension::Originality => &self.originality,
            Dimension::Musicality => &self.musicality,
        }
    }

    pub fn get_mut(&mut self, dim: Dimension) -> &mut T {
        match dim {
            Dimension::ImagePrecision => &mut self.image_precision,
            Dimension::Cut => &mut self.cut,
            Dimension::Economy => &mut self.economy,
            Dimension::Resonance => &mut self.resonance,
            Dimension::Originality => &mut self.originality,
            Dimension::Musicality => &mut self.musicality,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &T)> {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// Per-dimension judge scores for one side of a match.
pub type DimensionScores = DimensionMap<u8>;

/// Running mean per dimension; `None` until the first score arrives.
pub type DimensionAverages = DimensionMap<Option<f64>>;

impl DimensionScores {
    /// Sum of all six scores (6..=30 for a valid verdict).
    pub fn total(&self) -> u32 {
        self.iter().map(|(_, &v)| u32::from(v)).sum()
    }
}

/// Bibliographic details. None of these take part in rating.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provenance {
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub collection: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub translator: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<i32>,
}

/// A rateable poem plus its rating state.
///
/// Items are created by the corpus builder; this crate only ever touches the
/// rating-state fields (`rating` through `recent_opponents`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: String,
    pub lines: Vec<String>,
    pub source: Source,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub provenance: Provenance,
    #[cfg_attr(feature = "serde", serde(rename = "elo", default = "default_rating"))]
    pub rating: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub matches: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wins: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub losses: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub draws: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dim_averages: DimensionAverages,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_reasoning: Option<String>,
    /// Most recent opponent first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub recent_opponents: VecDeque<String>,
}

#[cfg(feature = "serde")]
fn default_rating() -> f64 {
    BASELINE_RATING
}

impl Item {
    /// A fresh item with default rating state.
    pub fn new(id: impl Into<String>, lines: Vec<String>, source: Source) -> Self {
        Item {
            id: id.into(),
            lines,
            source,
            provenance: Provenance::default(),
            rating: BASELINE_RATING,
            matches: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            dim_averages: DimensionAverages::default(),
            last_reasoning: None,
            recent_opponents: VecDeque::new(),
        }
    }

    pub fn has_recently_played(&self, opponent_id: &str) -> bool {
        self.recent_opponents.iter().any(|id| id == opponent_id)
    }
}

/// Which side the judge preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Winner {
    A,
    B,
    Draw,
}

impl Winner {
    /// Actual scores `(S_A, S_B)` for the ELO update.
    pub fn scores(self) -> (f64, f64) {
        match self {
            Winner::A => (1.0, 0.0),
            Winner::B => (0.0, 1.0),
            Winner::Draw => (0.5, 0.5),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Winner::A => "a",
            Winner::B => "b",
            Winner::Draw => "draw",
        }
    }
}

/// Validated outcome of one judged comparison. Consumed by `elo::apply_match`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verdict {
    pub a: DimensionScores,
    pub b: DimensionScores,
    pub winner: Winner,
    pub reasoning: String,
}

impl Verdict {
    /// Total scores `(A, B)`, each in 6..=30.
    pub fn totals(&self) -> (u32, u32) {
        (self.a.total(), self.b.total())
    }
}

/// Two distinct positions in a `RatingStore`, A first.
pub type IndexedPair = (usize, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_keys_round_trip() {
        for dim in Dimension::ALL {
            assert_eq!(Dimension::from_key(dim.key()), Some(dim));
        }
        assert_eq!(Dimension::from_key("rhyme"), None);
    }

    #[test]
    fn test_dimension_scores_total() {
        let scores = DimensionScores::from_fn(|_| 3);
        assert_eq!(scores.total(), 18);

        let mut scores = DimensionScores::from_fn(|_| 5);
        *scores.get_mut(Dimension::Cut) = 1;
        assert_eq!(scores.total(), 26);
    }

    #[test]
    fn test_new_item_defaults() {
        let item = Item::new("human-basho-1", vec!["old pond".into()], Source::Human);
        assert_eq!(item.rating, BASELINE_RATING);
        assert_eq!(item.matches, 0);
        assert!(item.dim_averages.iter().all(|(_, v)| v.is_none()));
        assert!(item.recent_opponents.is_empty());
        assert!(item.last_reasoning.is_none());
    }

    #[test]
    fn test_winner_scores() {
        assert_eq!(Winner::A.scores(), (1.0, 0.0));
        assert_eq!(Winner::B.scores(), (0.0, 1.0));
        assert_eq!(Winner::Draw.scores(), (0.5, 0.5));
    }
}
