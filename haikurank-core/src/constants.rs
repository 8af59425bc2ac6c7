/// Rating every item starts from before its first match.
pub const BASELINE_RATING: f64 = 1500.0;

/// K-factor for items that are still finding their level.
pub const K_FACTOR_NEW: f64 = 32.0;

/// K-factor once an item has played `K_FACTOR_THRESHOLD` matches.
pub const K_FACTOR_ESTABLISHED: f64 = 16.0;

/// Match count at which an item switches from `K_FACTOR_NEW` to `K_FACTOR_ESTABLISHED`.
pub const K_FACTOR_THRESHOLD: u32 = 20;

/// Number of most recent opponents remembered per item. A pair is rejected
/// while B is still inside A's window, so this is also the minimum number of
/// other matches A must play before a rematch with the same B.
pub const RECENT_OPPONENT_MEMORY: usize = 10;

/// Pair selection gives up after `PAIR_ATTEMPT_MULTIPLIER * n` draws.
///
/// With a small corpus or a long opponent memory most draws get rejected, so
/// the budget has to be generous, but it must stay bounded: a three-item corpus
/// where everyone has just played everyone can never yield a pair.
pub const PAIR_ATTEMPT_MULTIPLIER: usize = 20;

/// Default length of the per-category top lists in the ratings report.
pub const DEFAULT_TOP_K: usize = 10;

/// Lowest score the judge may give on a single dimension.
pub const MIN_DIMENSION_SCORE: u8 = 1;

/// Highest score the judge may give on a single dimension.
pub const MAX_DIMENSION_SCORE: u8 = 5;
