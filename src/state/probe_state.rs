/// Retry state machine for probing a single candidate ID
///
/// The decision of what to do after an attempt is a pure function of the
/// attempt number and that attempt's outcome, so it can be exercised without
/// any network or clock.
use crate::config::ProberConfig;
use crate::crawler::{ProbeOutcome, Resolved, TransientCause};
use std::fmt;
use std::time::Duration;

/// Where a probe currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// About to make attempt number `attempt` (1-based)
    Retrying { attempt: u32 },

    /// Classified as found or not found
    Resolved,

    /// Retry budget exhausted
    Abandoned,
}

impl ProbeState {
    /// State before the first attempt
    pub fn start() -> Self {
        Self::Retrying { attempt: 1 }
    }

    /// Returns true if no further attempts will be made
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Retrying { .. })
    }

    /// Applies a decision. Terminal states are absorbing.
    pub fn advance(self, action: &NextAction) -> Self {
        match (self, action) {
            (Self::Retrying { .. }, NextAction::Resolve(_)) => Self::Resolved,
            (Self::Retrying { attempt }, NextAction::Backoff { .. }) => Self::Retrying {
                attempt: attempt + 1,
            },
            (Self::Retrying { .. }, NextAction::Abandon { .. }) => Self::Abandoned,
            (terminal, _) => terminal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrying { .. } => "retrying",
            Self::Resolved => "resolved",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do after an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// Stop with a final classification
    Resolve(Resolved),

    /// Sleep for `delay`, then try the same ID again
    Backoff {
        delay: Duration,
        cause: TransientCause,
    },

    /// Give up on the ID
    Abandon { cause: TransientCause },
}

/// Fixed-delay retry policy
///
/// `max_retries` counts retries after the first attempt: an ID gets at most
/// `max_retries + 1` fetches and `max_retries` backoff sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn from_config(config: &ProberConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.backoff_ms))
    }

    /// Decides the next step after attempt number `attempt` (1-based)
    pub fn next_action(&self, attempt: u32, outcome: ProbeOutcome) -> NextAction {
        match outcome {
            ProbeOutcome::Found(document) => NextAction::Resolve(Resolved::Found(document)),
            ProbeOutcome::NotFound => NextAction::Resolve(Resolved::NotFound),
            ProbeOutcome::TransientFailure(cause) if attempt > self.max_retries => {
                NextAction::Abandon { cause }
            }
            ProbeOutcome::TransientFailure(cause) => NextAction::Backoff {
                delay: self.backoff,
                cause,
            },
        }
    }

    /// Largest number of fetches a single ID can receive
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ProberConfig::default())
    }
}
