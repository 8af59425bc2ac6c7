mod config;
mod corpus;
mod error;
mod judge;
mod oracle;
mod output;
mod parse;
mod prompt;
mod session;

use clap::Parser;
use haikurank_core::{summarize, RatingStore, DEFAULT_TOP_K, RECENT_OPPONENT_MEMORY};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::HaikurankConfig;
use crate::error::AppError;
use crate::judge::{Judge, RetryPolicy};
use crate::oracle::{build_oracle, OracleConfig};
use crate::session::{rate_and_save, SessionStats};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// Rows shown in the terminal leaderboard after a run.
const TABLE_ROWS: usize = 25;

#[derive(Parser)]
#[command(name = "haikurank", version, about = "Rank a haiku corpus with LLM-judged ELO matches")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Judge pairs of poems and update their ratings
    Rate(RateArgs),
    /// Rebuild the ratings report from the corpus without judging anything
    Summary(SummaryArgs),
    /// Create a default config file at ~/.config/haikurank/config.toml
    Init,
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Corpus JSON file (default: ratings/corpus.json)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Ratings report output path (default: ratings/ratings.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to config file (default: ~/.config/haikurank/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Length of the per-category top lists in the report
    #[arg(long)]
    top_k: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser)]
struct RateArgs {
    /// Number of pairs to compare
    #[arg(long)]
    pairs: Option<usize>,

    /// Judge model. "claude-*" uses the Anthropic API, anything else local Ollama.
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the judge backend selected by --model
    #[arg(long)]
    endpoint: Option<String>,

    /// API key for the hosted backend (also reads ANTHROPIC_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser)]
struct SummaryArgs {
    #[command(flatten)]
    common: CommonArgs,
}

/// Settings shared by every command after merging CLI > config > defaults.
struct Settings {
    corpus: PathBuf,
    output: PathBuf,
    top_k: usize,
    opponent_memory: usize,
}

impl Settings {
    fn resolve(args: &CommonArgs, cfg: &HaikurankConfig) -> Self {
        Settings {
            corpus: args
                .corpus
                .clone()
                .or_else(|| cfg.corpus.clone())
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CORPUS_PATH)),
            output: args
                .output
                .clone()
                .or_else(|| cfg.output.clone())
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_OUTPUT_PATH)),
            top_k: args.top_k.or(cfg.top_k).unwrap_or(DEFAULT_TOP_K),
            opponent_memory: cfg.recent_opponent_memory.unwrap_or(RECENT_OPPONENT_MEMORY),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(args: &CommonArgs) -> HaikurankConfig {
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    config::load_config(&config_path)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Rate(args) => run_rate(args).await,
        Commands::Summary(args) => run_summary(args),
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default model, corpus path, etc.");
            Ok(())
        }
    };

    if let Err(e) = result {
        bail(e);
    }
}

async fn run_rate(args: RateArgs) -> Result<(), AppError> {
    init_logging(args.common.verbose);
    let cfg = load_config(&args.common);
    let settings = Settings::resolve(&args.common, &cfg);

    let pairs = args.pairs.or(cfg.pairs).unwrap_or(config::DEFAULT_PAIRS);
    let model = args
        .model
        .clone()
        .or_else(|| cfg.model.clone())
        .unwrap_or_else(|| config::DEFAULT_MODEL.to_string());
    let timeout = Duration::from_secs(args.timeout.or(cfg.timeout_secs).unwrap_or(config::DEFAULT_TIMEOUT_SECS));
    let policy = RetryPolicy {
        attempts: cfg.attempts.unwrap_or(config::DEFAULT_ATTEMPTS),
        backoff: Duration::from_secs(cfg.backoff_secs.unwrap_or(config::DEFAULT_BACKOFF_SECS)),
    };
    if policy.attempts == 0 {
        bail("attempts must be at least 1");
    }

    // Corpus first: a missing corpus must fail before any judge setup
    let mut store = corpus::load_store(&settings.corpus, settings.opponent_memory)?;

    let hosted = oracle::is_hosted_model(&model);
    let mut ollama_url = cfg.ollama_url.clone().unwrap_or_else(|| config::DEFAULT_OLLAMA_URL.to_string());
    let mut anthropic_url = cfg
        .anthropic_url
        .clone()
        .unwrap_or_else(|| config::DEFAULT_ANTHROPIC_URL.to_string());
    if let Some(endpoint) = args.endpoint.clone() {
        if hosted {
            anthropic_url = endpoint;
        } else {
            ollama_url = endpoint;
        }
    }

    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(error::OracleError::from)?;
    let oracle = build_oracle(
        client,
        &OracleConfig {
            model,
            ollama_url,
            anthropic_url,
            api_key: args.api_key.clone().or_else(|| std::env::var("ANTHROPIC_API_KEY").ok()),
        },
    )?;
    let judge = Judge::new(oracle, policy);

    log_corpus(&store);
    info!("Running {pairs} comparisons with {}...", judge.label());

    let mut rng = rand::rng();
    let stats = rate_and_save(&mut store, &judge, pairs, &mut rng, &settings.corpus).await?;

    report(&store, &settings, args.common.json, Some(&stats))
}

fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    init_logging(args.common.verbose);
    let cfg = load_config(&args.common);
    let settings = Settings::resolve(&args.common, &cfg);

    let store = corpus::load_store(&settings.corpus, settings.opponent_memory)?;
    log_corpus(&store);
    report(&store, &settings, args.common.json, None)
}

fn log_corpus(store: &RatingStore) {
    let human = store.items().iter().filter(|i| i.source == haikurank_core::Source::Human).count();
    info!(
        "Corpus: {} poems ({} human, {} AI)",
        store.len(),
        human,
        store.len() - human
    );
}

/// Write the ratings report and print it.
fn report(
    store: &RatingStore,
    settings: &Settings,
    json: bool,
    stats: Option<&SessionStats>,
) -> Result<(), AppError> {
    let report = summarize(store.items(), settings.top_k, chrono::Utc::now());
    corpus::write_json_atomic(&settings.output, &report)?;
    info!("Ratings saved -> {}", settings.output.display());

    if json {
        output::print_json(&report, stats).unwrap_or_else(|e| bail(format!("Failed to print JSON: {e}")));
    } else {
        if let Some(stats) = stats {
            output::print_session(stats);
        }
        println!();
        output::print_table(&report, Some(TABLE_ROWS));
    }
    Ok(())
}
