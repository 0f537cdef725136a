//! Retry budgets and the tagged result of a retried command.

use std::time::Duration;

use thiserror::Error;

use super::backoff::{DEFAULT_BASE_INTERVAL, DEFAULT_MAX_DELAY};
use super::error::BootstrapError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryPolicyError {
    #[error("base retry interval must be greater than zero")]
    ZeroBaseInterval,

    #[error("maximum retry delay {max_delay:?} is below the base interval {base_interval:?}")]
    CeilingBelowBase {
        max_delay: Duration,
        base_interval: Duration,
    },
}

/// Budget for a retried command.
///
/// `None` limits are unbounded. With both limits unbounded, a command that
/// never reaches an accepted exit code is retried forever; the agent
/// convergence step relies on this to block until the node is converged or
/// an operator intervenes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: Option<u32>,
    max_wait: Option<Duration>,
    max_delay: Duration,
    base_interval: Duration,
}

impl RetryPolicy {
    /// Build a policy, checking `base_interval > 0` and `max_delay >= base_interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delay bounds are inconsistent.
    pub fn new(
        max_retries: Option<u32>,
        max_wait: Option<Duration>,
        max_delay: Duration,
        base_interval: Duration,
    ) -> Result<Self, RetryPolicyError> {
        if base_interval.is_zero() {
            return Err(RetryPolicyError::ZeroBaseInterval);
        }
        if max_delay < base_interval {
            return Err(RetryPolicyError::CeilingBelowBase {
                max_delay,
                base_interval,
            });
        }
        Ok(Self {
            max_retries,
            max_wait,
            max_delay,
            base_interval,
        })
    }

    /// A single attempt, no retries.
    #[must_use]
    pub const fn once() -> Self {
        Self::with_defaults(Some(0), Some(Duration::ZERO))
    }

    /// Up to `retries` retries, no time limit.
    #[must_use]
    pub const fn with_retries(retries: u32) -> Self {
        Self::with_defaults(Some(retries), None)
    }

    /// Retry until the command succeeds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::with_defaults(None, None)
    }

    const fn with_defaults(max_retries: Option<u32>, max_wait: Option<Duration>) -> Self {
        Self {
            max_retries,
            max_wait,
            max_delay: DEFAULT_MAX_DELAY,
            base_interval: DEFAULT_BASE_INTERVAL,
        }
    }

    #[must_use]
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    #[must_use]
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    #[must_use]
    pub fn base_interval(&self) -> Duration {
        self.base_interval
    }

    /// Whether the budget is spent after `retries` retries and `waited` total sleep.
    #[must_use]
    pub fn exhausted(&self, retries: u32, waited: Duration) -> Option<Exhaustion> {
        if self.max_retries.is_some_and(|limit| retries >= limit) {
            return Some(Exhaustion::RetryLimit);
        }
        if self.max_wait.is_some_and(|limit| waited >= limit) {
            return Some(Exhaustion::TimeLimit);
        }
        None
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhaustion {
    RetryLimit,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The command exited with an accepted code.
    Accepted,
    /// The budget ran out while the command was still failing.
    Exhausted(Exhaustion),
}

/// Result of running a command under a [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code of the last attempt.
    pub exit_code: i32,
    /// Retries performed (attempts minus one).
    pub retries: u32,
    /// Total time spent sleeping between attempts.
    pub waited: Duration,
    pub completion: Completion,
}

impl CommandOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.completion == Completion::Accepted
    }

    /// Turn an exhausted outcome into a fatal error naming `command`.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError::CommandExhausted` unless the outcome was accepted.
    pub fn require_accepted(self, command: &str) -> Result<Self, BootstrapError> {
        if self.is_accepted() {
            Ok(self)
        } else {
            Err(BootstrapError::CommandExhausted {
                command: command.to_string(),
                exit_code: self.exit_code,
                retries: self.retries,
            })
        }
    }
}
