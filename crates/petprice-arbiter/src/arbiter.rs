//! Candidate arbitration: pick the one search result that is the target.

use std::time::Duration;

use async_trait::async_trait;
use petprice_core::Candidate;

use crate::client::TextGenerator;
use crate::error::ArbiterError;
use crate::prompt::{build_prompt, parse_index};

/// Decides which candidate, if any, is the target product.
#[async_trait]
pub trait Arbiter: Send + Sync {
    /// Index into `candidates` of the match, or `None` for no match.
    async fn select(&self, candidates: &[Candidate], target: &str) -> Option<usize>;
}

/// Index-or-sentinel form of [`Arbiter::select`]: `-1` means no match.
pub async fn select_best_match<A: Arbiter + ?Sized>(
    arbiter: &A,
    candidates: &[Candidate],
    target: &str,
) -> i64 {
    match arbiter.select(candidates, target).await {
        Some(index) => i64::try_from(index).unwrap_or(-1),
        None => -1,
    }
}

/// Arbiter backed by a text-generation model.
///
/// Every call is bounded by `timeout`. Transport failures, timeouts and
/// unparseable answers all yield `None`; a missing answer is never read as
/// "the first candidate".
pub struct LlmArbiter<G> {
    generator: G,
    timeout: Duration,
}

impl<G: TextGenerator> LlmArbiter<G> {
    #[must_use]
    pub fn new(generator: G, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    async fn ask(&self, prompt: &str) -> Result<String, ArbiterError> {
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ArbiterError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl<G: TextGenerator> Arbiter for LlmArbiter<G> {
    async fn select(&self, candidates: &[Candidate], target: &str) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }

        let prompt = build_prompt(candidates, target);
        let response = match self.ask(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    target_name = %target,
                    candidates = candidates.len(),
                    error = %e,
                    "arbitration failed; treating as no match"
                );
                return None;
            }
        };

        let choice = parse_index(&response, candidates.len());
        tracing::debug!(
            target_name = %target,
            response = %response.trim(),
            choice = ?choice,
            "arbiter answered"
        );
        choice
    }
}

/// Deterministic arbiter for tests and offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubArbiter {
    answer: Option<usize>,
}

impl StubArbiter {
    /// Always answers `index` (when it is in range).
    #[must_use]
    pub fn always(index: usize) -> Self {
        Self {
            answer: Some(index),
        }
    }

    /// Never finds a match.
    #[must_use]
    pub fn never() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl Arbiter for StubArbiter {
    async fn select(&self, candidates: &[Candidate], _target: &str) -> Option<usize> {
        self.answer.filter(|i| *i < candidates.len())
    }
}
