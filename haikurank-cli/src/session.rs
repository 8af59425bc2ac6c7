/// Rating session: select pairs, judge them one at a time, apply results.
///
/// Pairs are processed strictly in selection order. A pair's update has to see
/// the ratings left behind by every earlier pair that shares an item, so
/// judging is never overlapped with applying.
use std::path::Path;

use haikurank_core::{select_pairs, RatingStore, Winner};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::corpus::save_store;
use crate::error::PersistError;
use crate::judge::Judge;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Pairs asked for.
    pub requested: usize,
    /// Pairs the selector produced; every one of them is attempted.
    pub attempted: usize,
    /// Pairs that produced a valid verdict and were applied.
    pub completed: usize,
    /// Pairs skipped after the judge gave up.
    pub errors: usize,
    /// Extra attempts spent on pairs that eventually succeeded.
    pub retries: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
}

/// Run one session against the store. Persisting the result is the caller's job.
pub async fn run_session(
    store: &mut RatingStore,
    judge: &Judge,
    pair_count: usize,
    rng: &mut impl Rng,
) -> SessionStats {
    let selection = select_pairs(store.items(), pair_count, rng);
    if let Some(shortfall) = selection.shortfall() {
        warn!(attempts = selection.attempts, "{shortfall}");
    }

    let mut stats = SessionStats {
        requested: pair_count,
        attempted: selection.pairs.len(),
        ..SessionStats::default()
    };
    let total = selection.pairs.len();

    for (i, &(a_idx, b_idx)) in selection.pairs.iter().enumerate() {
        let (Some(a), Some(b)) = (store.get(a_idx), store.get(b_idx)) else {
            continue;
        };
        info!("[{}/{}] {} vs {}", i + 1, total, a.id, b.id);

        let judgement = match judge.judge(a, b).await {
            Ok(judgement) => judgement,
            Err(failure) => {
                warn!(a = %a.id, b = %b.id, "skipping pair: {failure}");
                stats.errors += 1;
                continue;
            }
        };

        let verdict = &judgement.verdict;
        store.record_match((a_idx, b_idx), verdict);
        stats.completed += 1;
        stats.retries += judgement.attempts_used - 1;

        let label = match verdict.winner {
            Winner::A => {
                stats.a_wins += 1;
                "A wins"
            }
            Winner::B => {
                stats.b_wins += 1;
                "B wins"
            }
            Winner::Draw => {
                stats.draws += 1;
                "Draw"
            }
        };

        let (total_a, total_b) = verdict.totals();
        if let (Some(a), Some(b)) = (store.get(a_idx), store.get(b_idx)) {
            info!(
                "  {label} | A:{total_a}/30  B:{total_b}/30 | {} -> {}  {} -> {}",
                a.id, a.rating, b.id, b.rating
            );
        }
        if !verdict.reasoning.is_empty() {
            info!("  \"{}\"", verdict.reasoning);
        }
    }

    stats
}

/// Run one session, then write the whole corpus back to `corpus_path`.
///
/// The snapshot is written even when no pair succeeded.
pub async fn rate_and_save(
    store: &mut RatingStore,
    judge: &Judge,
    pair_count: usize,
    rng: &mut impl Rng,
    corpus_path: &Path,
) -> Result<SessionStats, PersistError> {
    let stats = run_session(store, judge, pair_count, rng).await;
    save_store(store, corpus_path)?;
    info!("Corpus saved -> {}", corpus_path.display());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::testing::{uniform_response, ScriptedOracle};
    use crate::corpus::load_store;
    use crate::judge::RetryPolicy;
    use haikurank_core::{Item, Source};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn store(n: usize) -> RatingStore {
        let items = (0..n)
            .map(|i| {
                let source = if i % 2 == 0 { Source::Human } else { Source::Ai };
                Item::new(format!("p{i}"), vec![format!("line {i}")], source)
            })
            .collect();
        RatingStore::new(items, 10).unwrap()
    }

    fn judge(oracle: ScriptedOracle, attempts: usize) -> Judge {
        Judge::new(
            Box::new(oracle),
            RetryPolicy {
                attempts,
                backoff: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_single_match_end_to_end() {
        let mut store = store(2);
        let judge = judge(ScriptedOracle::always(&uniform_response("a", 3, 3)), 3);
        let mut rng = StdRng::seed_from_u64(5);

        let stats = run_session(&mut store, &judge, 1, &mut rng).await;
        assert_eq!(
            stats,
            SessionStats {
                requested: 1,
                attempted: 1,
                completed: 1,
                errors: 0,
                retries: 0,
                a_wins: 1,
                b_wins: 0,
                draws: 0,
            }
        );

        // Side A is whichever item the selector put first
        let winner = store.items().iter().find(|i| i.wins == 1).unwrap();
        let loser = store.items().iter().find(|i| i.losses == 1).unwrap();
        assert_ne!(winner.id, loser.id);
        assert_eq!(winner.rating, 1516.0);
        assert_eq!(loser.rating, 1484.0);
        assert_eq!((winner.matches, loser.matches), (1, 1));
        assert_eq!(winner.dim_averages.cut, Some(3.0));
        assert_eq!(loser.dim_averages.cut, Some(3.0));
        assert_eq!(winner.last_reasoning.as_deref(), Some("scripted"));
    }

    #[tokio::test]
    async fn test_judge_failures_skip_without_mutation() {
        let mut store = store(4);
        let before = store.items().to_vec();
        let judge = judge(ScriptedOracle::new(vec![Err(500)]), 2);
        let mut rng = StdRng::seed_from_u64(9);

        let stats = run_session(&mut store, &judge, 5, &mut rng).await;
        assert_eq!(stats.attempted, 5);
        assert_eq!(stats.errors, 5);
        assert_eq!(stats.completed, 0);
        assert_eq!(store.items(), before.as_slice());
    }

    #[tokio::test]
    async fn test_mixed_outcomes_tallied() {
        let mut store = store(6);
        let oracle = ScriptedOracle::new(vec![
            Ok(uniform_response("a", 4, 2)),
            Ok(uniform_response("b", 2, 4)),
            // invalid twice: pair 3 is skipped
            Ok("no json here".to_string()),
            Ok(uniform_response("a", 9, 2)),
            Ok(uniform_response("draw", 3, 3)),
        ]);
        let judge = judge(oracle, 2);
        let mut rng = StdRng::seed_from_u64(21);

        let stats = run_session(&mut store, &judge, 4, &mut rng).await;
        assert_eq!(stats.attempted, 4);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!((stats.a_wins, stats.b_wins, stats.draws), (1, 1, 1));
        assert_eq!(stats.retries, 0);

        let recorded: u32 = store.items().iter().map(|i| i.matches).sum();
        assert_eq!(recorded, 6);
        for item in store.items() {
            assert_eq!(item.matches, item.wins + item.losses + item.draws);
        }
    }

    #[tokio::test]
    async fn test_tiny_corpus_runs_nothing() {
        let mut store = store(1);
        let judge = judge(ScriptedOracle::always(&uniform_response("a", 3, 3)), 3);
        let mut rng = StdRng::seed_from_u64(1);

        let stats = run_session(&mut store, &judge, 10, &mut rng).await;
        assert_eq!(stats.attempted, 0);
        assert_eq!(stats.completed, 0);
    }

    #[tokio::test]
    async fn test_rate_and_save_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        save_store(&store(6), &path).unwrap();

        let mut store = load_store(&path, 10).unwrap();
        let oracle = ScriptedOracle::new(vec![
            Ok(uniform_response("a", 4, 2)),
            Ok(uniform_response("draw", 3, 3)),
            Err(503),
            Err(503),
            Ok(uniform_response("b", 1, 5)),
        ]);
        let judge = judge(oracle, 2);
        let mut rng = StdRng::seed_from_u64(13);

        let stats = rate_and_save(&mut store, &judge, 4, &mut rng, &path).await.unwrap();
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.errors, 1);

        let reloaded = load_store(&path, 10).unwrap();
        assert_eq!(reloaded.items(), store.items());
        let recorded: u32 = reloaded.items().iter().map(|i| i.matches).sum();
        assert_eq!(recorded, 6);
    }

    #[tokio::test]
    async fn test_rate_and_save_writes_snapshot_when_every_pair_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        let original = store(4);
        // Compact on disk, so a rewrite is visible as pretty JSON
        std::fs::write(&path, serde_json::to_string(original.items()).unwrap()).unwrap();

        let mut store = load_store(&path, 10).unwrap();
        let judge = judge(ScriptedOracle::new(vec![Err(500)]), 2);
        let mut rng = StdRng::seed_from_u64(3);

        let stats = rate_and_save(&mut store, &judge, 3, &mut rng, &path).await.unwrap();
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.errors, 3);

        let written = std::fs::read_to_string(&path).unwrap();
        let expected = format!("{}\n", serde_json::to_string_pretty(original.items()).unwrap());
        assert_eq!(written, expected);
        assert_eq!(load_store(&path, 10).unwrap().items(), original.items());
    }
}
