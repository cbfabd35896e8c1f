//! Lookup outcomes and the per-run result set.
//!
//! Failures are data here: every identifier ends a run with exactly one
//! [`LookupOutcome`] variant, so the scheduler never needs failure handling
//! beyond collecting records and renderers can show successes and failures
//! side by side.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::date::{DateRange, ResolvedDate};

/// Failures worth retrying: the request was fine, the world was not.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum TransientCause {
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by server (HTTP 429)")]
    RateLimited,
    #[error("server error (HTTP {0})")]
    Server(u16),
    #[error("network error: {0}")]
    Network(String),
}

/// Failures retrying cannot help: the request or response itself is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FatalCause {
    #[error("unexpected status (HTTP {0})")]
    Status(u16),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// The single outcome of resolving one identifier in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LookupOutcome {
    /// The remote record carried a creation date.
    Resolved(ResolvedDate),
    /// Valid identifier, but the source has no record (or no date) for it.
    NotFound,
    /// The input token never normalized into an identifier.
    InvalidIdentifier,
    /// Network, timeout, rate-limit or server trouble; retried per policy
    /// and surfaced unchanged if retries are exhausted.
    TransientError(TransientCause),
    /// Malformed request or response; never retried.
    FatalError(FatalCause),
    /// The run was cancelled before this identifier was resolved.
    Cancelled,
}

impl LookupOutcome {
    /// The resolved date, when there is one.
    pub fn resolved(&self) -> Option<&ResolvedDate> {
        match self {
            LookupOutcome::Resolved(date) => Some(date),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, LookupOutcome::TransientError(_))
    }
}

/// One identifier's outcome, tagged with the input batch it came from.
///
/// `id` is the canonical DOI for dispatched identifiers; for rejected tokens
/// it is the trimmed raw token, so invalid rows stay traceable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionRecord {
    pub id: String,
    pub outcome: LookupOutcome,
    pub source: String,
}

/// The result set of one run: identifier → record, keys unique.
///
/// Later inserts for the same identifier overwrite the record and its source
/// attribution (last-write-wins) but keep the first-seen display position,
/// so iteration order is deterministic across merge orders.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    order: Vec<String>,
    records: HashMap<String, ResolutionRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any earlier record for the same id.
    pub fn insert(&mut self, record: ResolutionRecord) {
        if !self.records.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&ResolutionRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in first-seen insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolutionRecord> {
        self.order
            .iter()
            .filter_map(move |id| self.records.get(id.as_str()))
    }

    /// Pure projection keeping only resolved records whose date falls inside
    /// the inclusive range. The receiver is left untouched; filtering twice
    /// with the same range gives the same result.
    pub fn filter(&self, range: &DateRange) -> ResultSet {
        let mut filtered = ResultSet::new();
        for record in self.iter() {
            if record
                .outcome
                .resolved()
                .is_some_and(|date| range.contains(date))
            {
                filtered.insert(record.clone());
            }
        }
        filtered
    }
}
