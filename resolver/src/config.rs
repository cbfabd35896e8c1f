//! Engine configuration.
//!
//! Everything the engine tunes is an explicit named field here; there is no
//! environment or hidden global inside the engine. The CLI maps its flags
//! onto this struct.

use std::time::Duration;

use crate::date::DateRange;
use crate::error::ResolverError;

/// Configuration for one resolution run.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Worker pool size: how many lookups may be in flight at once.
    pub concurrency: usize,
    /// Per-request timeout, covering both the limiter wait and the HTTP call.
    pub request_timeout: Duration,
    /// Total attempts per identifier, including the first.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Upper bound on any single backoff wait.
    pub max_delay: Duration,
    /// Global request-rate ceiling, in requests per second.
    pub rate_per_sec: f64,
    /// Optional inclusive year-month filter applied to resolved records.
    pub date_range: DateRange,
    /// Crossref API root; overridable so tests can point at a local server.
    pub base_url: String,
    /// Sent on every request. Crossref routes clients that identify
    /// themselves with a mailto contact into its polite pool.
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            request_timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            rate_per_sec: 10.0,
            date_range: DateRange::default(),
            base_url: "https://api.crossref.org".to_string(),
            user_agent: concat!(
                "doi-dates/",
                env!("CARGO_PKG_VERSION"),
                " (mailto:doi-dates@example.com)"
            )
            .to_string(),
        }
    }
}

impl ResolverConfig {
    /// Rejects configurations no run could execute. Checked before any work
    /// begins; this is the only process-level failure path in the engine.
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.concurrency == 0 {
            return Err(ResolverError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ResolverError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.rate_per_sec > 0.0) {
            return Err(ResolverError::InvalidConfig(
                "rate_per_sec must be positive".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ResolverError::InvalidConfig(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
