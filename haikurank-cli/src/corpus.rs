/// Corpus and report persistence.
///
/// Every write is a whole snapshot: serialize, write a temp file next to the
/// destination, then rename it over the destination. A crash mid-write leaves
/// the previous file intact.
use std::io::Write;
use std::path::Path;

use haikurank_core::{Item, RatingStore};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{CorpusUnavailable, PersistError};

/// Load the corpus into a rating store.
pub fn load_store(path: &Path, opponent_memory: usize) -> Result<RatingStore, CorpusUnavailable> {
    let unavailable = |reason: String| CorpusUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    let items: Vec<Item> =
        serde_json::from_str(&content).map_err(|e| unavailable(format!("malformed corpus: {e}")))?;
    RatingStore::new(items, opponent_memory).map_err(|e| unavailable(e.to_string()))
}

/// Atomically write `value` as pretty JSON to `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let io_err = |source: std::io::Error| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Save the full corpus, overwriting `path`.
pub fn save_store(store: &RatingStore, path: &Path) -> Result<(), PersistError> {
    write_json_atomic(path, store.items())
}
