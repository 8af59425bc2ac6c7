/// Error types for the haikurank CLI.
use std::path::PathBuf;

/// The persisted corpus could not be loaded. Fatal: nothing runs without it.
#[derive(Debug, thiserror::Error)]
#[error("corpus unavailable at {}: {reason}", path.display())]
pub struct CorpusUnavailable {
    pub path: PathBuf,
    pub reason: String,
}

/// Writing a snapshot (corpus or report) failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Talking to a judge backend failed before any text came back.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oracle returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle response had no text content")]
    EmptyResponse,

    #[error("missing API key for {backend} (set ANTHROPIC_API_KEY or pass --api-key)")]
    MissingApiKey { backend: &'static str },
}

/// A response came back but is not a usable verdict.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum VerdictError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("missing scores for side {side}")]
    MissingSide { side: &'static str },

    #[error("side {side} is missing dimension {dimension}")]
    MissingDimension {
        side: &'static str,
        dimension: &'static str,
    },

    #[error("side {side} dimension {dimension} has invalid score {value}")]
    InvalidScore {
        side: &'static str,
        dimension: &'static str,
        value: String,
    },

    #[error("invalid winner {0}")]
    InvalidWinner(String),
}

/// Why a single attempt at judging a pair failed.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("invalid verdict: {0}")]
    Verdict(#[from] VerdictError),
}

/// Every attempt at judging a pair failed. The session skips the pair.
#[derive(Debug, thiserror::Error)]
#[error("judge failed after {attempts} attempts: {last_error}")]
pub struct JudgeFailure {
    pub attempts: usize,
    pub last_error: AttemptError,
}

/// Fatal errors surfaced by a command.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Corpus(#[from] CorpusUnavailable),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}
