/// haikurank-core: Pure-computation rating engine for a haiku corpus.
///
/// Pairs of poems → external judge verdict → ELO update → leaderboard.
/// No IO, no HTTP, no filesystem. The judge lives in the caller; this crate
/// only consumes validated `Verdict`s.
///
/// Items are identified by their string ids. `RatingStore` owns the corpus and
/// is the only thing that mutates rating state.
///
/// # Quick start
///
/// ```rust
/// use haikurank_core::{
///     select_pairs, DimensionScores, Item, RatingStore, Source, Verdict, Winner,
///     RECENT_OPPONENT_MEMORY,
/// };
///
/// let items = vec![
///     Item::new("human-basho-1", vec!["old pond".into(), "a frog jumps in".into(), "water's sound".into()], Source::Human),
///     Item::new("ai-dusk-1", vec!["dusk settles".into(), "the kettle forgets".into(), "its song".into()], Source::Ai),
/// ];
/// let mut store = RatingStore::new(items, RECENT_OPPONENT_MEMORY).unwrap();
///
/// let selection = select_pairs(store.items(), 1, &mut rand::rng());
/// for &pair in &selection.pairs {
///     let verdict = Verdict {
///         a: DimensionScores::from_fn(|_| 4),
///         b: DimensionScores::from_fn(|_| 3),
///         winner: Winner::A,
///         reasoning: "The first image is sharper.".into(),
///     };
///     store.record_match(pair, &verdict);
/// }
/// ```

pub mod constants;
pub mod elo;
pub mod error;
pub mod pairing;
pub mod store;
pub mod summary;
pub mod types;

// Re-export primary public API at crate root.
pub use constants::{BASELINE_RATING, DEFAULT_TOP_K, RECENT_OPPONENT_MEMORY};
pub use elo::{apply_match, expected_score, k_factor};
pub use error::{CorpusError, InsufficientPairs};
pub use pairing::{select_pairs, selection_weights, PairSelection};
pub use store::RatingStore;
pub use summary::{summarize, CategorySummary, LeaderboardEntry, Report, Summary, TopEntry};
pub use types::{
    Dimension, DimensionAverages, DimensionMap, DimensionScores, IndexedPair, Item, Provenance,
    Source, Verdict, Winner,
};
