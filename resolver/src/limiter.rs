//! Request-rate limiter shared by all workers of one run.
//!
//! Admissions are spaced one interval (`1 / rate_per_sec`) apart: the state
//! is a single next-free-slot instant behind a mutex, so however workers
//! interleave, no two admissions can land inside the same interval. Waiting
//! suspends on the tokio timer, never busy-waits.
//!
//! Each run constructs its own limiter and drops it at run end; there is no
//! process-wide instance, so concurrent runs (and tests) never interfere.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Interval-spaced admission control for outbound lookups.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// A limiter admitting at most `rate_per_sec` operations per second.
    /// `rate_per_sec` must be positive; configs are validated upstream.
    pub fn new(rate_per_sec: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / rate_per_sec),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Waits until this caller's admission slot arrives.
    ///
    /// The first caller is admitted immediately; each subsequent caller is
    /// scheduled one interval after the previous admission. Slots are claimed
    /// before sleeping, so the lock is never held across an await.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().expect("limiter lock poisoned");
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.interval;
            slot
        };
        sleep_until(slot).await;
    }
}
