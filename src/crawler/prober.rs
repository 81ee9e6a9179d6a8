//! Per-ID probing with fixed-delay retries
//!
//! `Prober::probe` runs the retry loop: fetch, classify, then act on the
//! `NextAction` that `RetryPolicy` returns for the attempt. The loop keeps
//! its own attempt counter; the matching `ProbeState` is only reported in
//! trace events. Abandonment surfaces as `DiscoError::GaveUp` and is meant
//! to end the whole range scan.

use crate::crawler::fetcher::{EndpointTemplate, Fetcher, Resolved};
use crate::range::CandidateId;
use crate::state::{NextAction, ProbeState, RetryPolicy};
use crate::DiscoError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Suspends the probe between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// `Sleeper` backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Diagnostic counters, cumulative over the prober's lifetime
#[derive(Debug, Default)]
pub struct ProbeCounters {
    attempts: AtomicU64,
    transient_failures: AtomicU64,
    backoffs: AtomicU64,
}

/// Point-in-time copy of `ProbeCounters`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeTally {
    pub attempts: u64,
    pub transient_failures: u64,
    pub backoffs: u64,
}

impl ProbeCounters {
    pub fn snapshot(&self) -> ProbeTally {
        ProbeTally {
            attempts: self.attempts.load(Ordering::Relaxed),
            transient_failures: self.transient_failures.load(Ordering::Relaxed),
            backoffs: self.backoffs.load(Ordering::Relaxed),
        }
    }
}

impl ProbeTally {
    /// Activity between an earlier snapshot and this one
    pub fn since(&self, earlier: &ProbeTally) -> ProbeTally {
        ProbeTally {
            attempts: self.attempts.saturating_sub(earlier.attempts),
            transient_failures: self
                .transient_failures
                .saturating_sub(earlier.transient_failures),
            backoffs: self.backoffs.saturating_sub(earlier.backoffs),
        }
    }
}

/// Probes candidate IDs one at a time
pub struct Prober<F, S = TokioSleeper> {
    fetcher: F,
    sleeper: S,
    endpoint: EndpointTemplate,
    policy: RetryPolicy,
    counters: ProbeCounters,
}

impl<F: Fetcher> Prober<F, TokioSleeper> {
    /// Creates a prober that sleeps on the tokio timer
    pub fn new(fetcher: F, endpoint: EndpointTemplate, policy: RetryPolicy) -> Self {
        Self::with_sleeper(fetcher, TokioSleeper, endpoint, policy)
    }
}

impl<F: Fetcher, S: Sleeper> Prober<F, S> {
    pub fn with_sleeper(
        fetcher: F,
        sleeper: S,
        endpoint: EndpointTemplate,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            sleeper,
            endpoint,
            policy,
            counters: ProbeCounters::default(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn endpoint(&self) -> &EndpointTemplate {
        &self.endpoint
    }

    pub fn counters(&self) -> ProbeTally {
        self.counters.snapshot()
    }

    /// Probes one ID until it resolves or the retry budget runs out
    ///
    /// # Returns
    ///
    /// * `Ok(Resolved::Found(doc))` - HTTP 200 with a non-empty body
    /// * `Ok(Resolved::NotFound)` - HTTP 404
    /// * `Err(DiscoError::GaveUp)` - `max_retries + 1` transient failures in a row
    pub async fn probe(&self, id: CandidateId) -> Result<Resolved, DiscoError> {
        let url = self.endpoint.url_for(id);
        let mut attempt = 1;

        loop {
            tracing::debug!(id, attempt, url = %url, "Probe attempted");
            self.counters.attempts.fetch_add(1, Ordering::Relaxed);

            let outcome = self.fetcher.fetch(id, &url).await;
            tracing::debug!(id, attempt, outcome = outcome.label(), "Outcome classified");

            let action = self.policy.next_action(attempt, outcome);
            let next_state = ProbeState::Retrying { attempt }.advance(&action);
            tracing::trace!(id, state = %next_state, "Probe state changed");

            match action {
                NextAction::Resolve(resolved) => return Ok(resolved),
                NextAction::Backoff { delay, cause } => {
                    self.counters
                        .transient_failures
                        .fetch_add(1, Ordering::Relaxed);
                    self.counters.backoffs.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        id,
                        attempt,
                        cause = %cause,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                NextAction::Abandon { cause } => {
                    self.counters
                        .transient_failures
                        .fetch_add(1, Ordering::Relaxed);
                    tracing::error!(id, attempts = attempt, cause = %cause, "Giving up");
                    return Err(DiscoError::GaveUp {
                        id,
                        attempts: attempt,
                        cause,
                    });
                }
            }
        }
    }
}
