/// Errors raised while assembling a `RatingStore` from loaded items.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CorpusError {
    #[error("duplicate item id: {id}")]
    DuplicateId { id: String },

    #[error("unknown item id: {id}")]
    UnknownId { id: String },

    #[error("item {id}: matches ({matches}) != wins + losses + draws ({recorded})")]
    CounterMismatch { id: String, matches: u32, recorded: u32 },

    #[error("item {id}: rating {rating} is not finite")]
    NonFiniteRating { id: String, rating: f64 },
}

/// Soft warning: the selector ran out of attempts before filling the request.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("only found {found} valid pairs (requested {requested})")]
pub struct InsufficientPairs {
    pub requested: usize,
    pub found: usize,
}
