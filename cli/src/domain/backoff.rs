//! Randomized exponential backoff.
//!
//! The delay is computed in milliseconds and handed out as a `Duration`, so
//! early attempts wait well under the base interval and later attempts
//! approach the ceiling.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default base interval for command retries.
pub const DEFAULT_BASE_INTERVAL: Duration = Duration::from_millis(1_000);

/// Default ceiling for a single command retry delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(15_000);

/// Upper bound of the delay before attempt `attempt + 1`:
/// `min(ceiling, base * 2^attempt)`, saturating.
#[must_use]
pub fn seed(attempt: u32, base: Duration, ceiling: Duration) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let ceiling_ms = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(ceiling_ms.min(base_ms.saturating_mul(factor)))
}

/// Delay to sleep after failed attempt number `attempt` (0-based).
///
/// Always within `[seed / 2, seed]`.
pub fn next_delay(attempt: u32, base: Duration, ceiling: Duration, rng: &mut impl Rng) -> Duration {
    let seed_ms = u64::try_from(seed(attempt, base, ceiling).as_millis()).unwrap_or(u64::MAX);
    let half = seed_ms / 2;
    let spread = seed_ms - half;
    Duration::from_millis(half + rng.gen_range(0..=spread))
}

/// Shared randomness source for retry loops.
pub struct Backoff {
    rng: Mutex<StdRng>,
}

impl Backoff {
    /// Seed from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic source for tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Jittered delay for the given attempt.
    pub fn delay(&self, attempt: u32, base: Duration, ceiling: Duration) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        next_delay(attempt, base, ceiling, &mut *rng)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_entropy()
    }
}
