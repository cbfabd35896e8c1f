//! Retry with jittered exponential backoff around a [`DateSource`].
//!
//! Only transient failures are retried. `Resolved`, `NotFound` and fatal
//! outcomes short-circuit, and exhausting the attempt limit returns the last
//! transient error unchanged rather than upgrading it. Every wait races the
//! run's cancellation token, so a cancelled run never sits out a backoff.

use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::doi::Doi;
use crate::outcome::LookupOutcome;
use crate::source::DateSource;

/// Backoff schedule for transient lookup failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per identifier, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Cap on any single delay, applied before and after jitter.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`,
    /// capped at `max_delay`, with ±25% uniform jitter so a batch of workers
    /// hitting the same outage does not retry in lockstep.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(attempt.min(30) as i32);
        let capped = exponential.min(self.max_delay.as_secs_f64());
        let jittered = capped * rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_secs_f64(jittered).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Resolves one identifier through `source`, retrying transient failures per
/// `policy`. Returns [`LookupOutcome::Cancelled`] as soon as `cancel` fires,
/// whether mid-attempt or mid-backoff.
pub async fn resolve_with_retry(
    source: &dyn DateSource,
    doi: &Doi,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> LookupOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        if cancel.is_cancelled() {
            return LookupOutcome::Cancelled;
        }
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return LookupOutcome::Cancelled,
            outcome = source.lookup(doi) => outcome,
        };
        match outcome {
            LookupOutcome::TransientError(cause) => {
                attempt += 1;
                if attempt >= max_attempts {
                    warn!(doi = %doi, attempts = max_attempts, cause = %cause, "retries exhausted");
                    return LookupOutcome::TransientError(cause);
                }
                let delay = policy.delay(attempt - 1);
                warn!(doi = %doi, attempt, delay_ms = delay.as_millis() as u64, cause = %cause, "transient failure, backing off");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return LookupOutcome::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            outcome => return outcome,
        }
    }
}
