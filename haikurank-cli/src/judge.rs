/// Judge client: one comparison request, validated, retried on failure.
use std::time::Duration;

use haikurank_core::{Item, Verdict};
use tracing::{debug, warn};

use crate::error::{AttemptError, JudgeFailure};
use crate::oracle::Oracle;
use crate::parse::parse_verdict;
use crate::prompt::{build_prompt, JUDGE_SYSTEM};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per pair, including the first.
    pub attempts: usize,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

/// A validated verdict plus what it took to get it.
#[derive(Debug, Clone)]
pub struct Judgement {
    pub verdict: Verdict,
    pub attempts_used: usize,
}

pub struct Judge {
    oracle: Box<dyn Oracle>,
    policy: RetryPolicy,
}

impl Judge {
    pub fn new(oracle: Box<dyn Oracle>, policy: RetryPolicy) -> Self {
        Judge { oracle, policy }
    }

    pub fn label(&self) -> String {
        self.oracle.label()
    }

    async fn attempt(&self, prompt: &str) -> Result<Verdict, AttemptError> {
        let text = self.oracle.submit(JUDGE_SYSTEM, prompt).await?;
        debug!(response = %text, "oracle response");
        parse_verdict(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            warn!(error = %e, response = %preview, "invalid judge response");
            AttemptError::from(e)
        })
    }

    /// Compare `a` against `b`.
    ///
    /// Transport errors and invalid responses are both retried, with the same
    /// fixed backoff, until the attempt budget runs out.
    pub async fn judge(&self, a: &Item, b: &Item) -> Result<Judgement, JudgeFailure> {
        let prompt = build_prompt(&a.lines, &b.lines);
        let attempts = self.policy.attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.attempt(&prompt).await {
                Ok(verdict) => {
                    return Ok(Judgement {
                        verdict,
                        attempts_used: attempt,
                    })
                }
                Err(e) if attempt >= attempts => {
                    return Err(JudgeFailure {
                        attempts,
                        last_error: e,
                    })
                }
                Err(e) => {
                    warn!(
                        attempt,
                        attempts,
                        a = %a.id,
                        b = %b.id,
                        error = %e,
                        "judge attempt failed, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
