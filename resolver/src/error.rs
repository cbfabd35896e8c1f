//! Process-level errors.
//!
//! Per-identifier failures are data ([`crate::outcome::LookupOutcome`]); the
//! only errors that escape as `Err` are the ones that stop a run before any
//! work begins.

use thiserror::Error;

/// Errors surfaced before a run starts.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
