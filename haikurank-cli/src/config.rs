/// Config file loading and creation for the haikurank CLI.
///
/// Config lives at ~/.config/haikurank/config.toml.
/// All fields are optional; CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

pub const DEFAULT_MODEL: &str = "llama3.1";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CORPUS_PATH: &str = "ratings/corpus.json";
pub const DEFAULT_OUTPUT_PATH: &str = "ratings/ratings.json";
pub const DEFAULT_PAIRS: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_ATTEMPTS: usize = 3;
pub const DEFAULT_BACKOFF_SECS: u64 = 2;

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HaikurankConfig {
    pub model: Option<String>,
    pub ollama_url: Option<String>,
    pub anthropic_url: Option<String>,
    pub corpus: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pairs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub attempts: Option<usize>,
    pub backoff_secs: Option<u64>,
    pub recent_opponent_memory: Option<usize>,
    pub top_k: Option<usize>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# haikurank configuration
# All values here can be overridden by CLI flags.

# Judge model. Names starting with \"claude-\" use the Anthropic API,
# anything else is sent to the local Ollama server.
# model = \"llama3.1\"

# Local Ollama server
# ollama_url = \"http://localhost:11434\"

# Anthropic API base URL
# anthropic_url = \"https://api.anthropic.com\"

# API key: use ANTHROPIC_API_KEY env var or --api-key flag (not stored in config)

# Corpus file (read and rewritten by `haikurank rate`)
# corpus = \"ratings/corpus.json\"

# Ratings report written after every run
# output = \"ratings/ratings.json\"

# Number of pairs to judge per run
# pairs = 50

# Per-request timeout, in seconds
# timeout_secs = 120

# Attempts per pair before it is skipped, and the pause between them
# attempts = 3
# backoff_secs = 2

# How many recent opponents each poem remembers to avoid rematches
# recent_opponent_memory = 10

# Length of the per-category top lists in the report
# top_k = 10
";

/// Returns the default config path: ~/.config/haikurank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("haikurank").join("config.toml")
}

/// Parse config text. Kept separate from file IO for testing.
pub fn parse_config(content: &str) -> Result<HaikurankConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> HaikurankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HaikurankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config() -> PathBuf {
    let path = config_path();

    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_empty_config() {
        let cfg = parse_config(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(cfg, HaikurankConfig::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let cfg = parse_config("model = \"claude-sonnet-4-5\"\npairs = 200\ncorpus = \"data/corpus.json\"\n").unwrap();
        assert_eq!(cfg.model.as_deref(), Some("claude-sonnet-4-5"));
        assert_eq!(cfg.pairs, Some(200));
        assert_eq!(cfg.corpus, Some(PathBuf::from("data/corpus.json")));
        assert_eq!(cfg.timeout_secs, None);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(parse_config("rounds = 3\n").is_err());
    }
}
