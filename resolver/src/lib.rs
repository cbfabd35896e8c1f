//! # doi-resolver
//!
//! Concurrent batch resolution of DOIs to Crossref publication dates. The
//! engine takes batches of raw identifier tokens, normalizes and
//! deduplicates them, fans lookups out across a bounded worker pool with
//! rate limiting and retry, and hands back one record per identifier —
//! successes and failures side by side, never an aborted batch.
//!
//! ## Design
//!
//! - **Outcome as data**: every lookup path returns a [`LookupOutcome`]
//!   variant; the scheduler collects records and nothing else.
//! - **Bounded load**: a fixed worker pool ([`resolve_all`]) plus a per-run
//!   [`RateLimiter`] turn "N identifiers" into bounded concurrent load.
//! - **Cooperative cancellation**: limiter waits, backoff sleeps and HTTP
//!   calls all race the run's `CancellationToken`; a cancelled run returns
//!   a full record set with [`LookupOutcome::Cancelled`] for the remainder.
//! - **Trait seam**: the network lives behind [`DateSource`], so tests drive
//!   the whole pipeline with scripted stubs.
//!
//! ## Main modules
//!
//! - [`doi`]: [`Doi`] normalization and validation.
//! - [`date`]: [`ResolvedDate`], [`DatePrecision`], [`YearMonth`], [`DateRange`].
//! - [`outcome`]: [`LookupOutcome`], [`ResolutionRecord`], [`ResultSet`].
//! - [`limiter`] / [`client`]: rate-limited Crossref lookups.
//! - [`retry`]: [`RetryPolicy`] and [`resolve_with_retry`].
//! - [`scheduler`]: [`resolve_all`] worker pool.
//! - [`aggregate`]: batch merging with last-write-wins.
//! - [`config`] / [`error`]: [`ResolverConfig`], [`ResolverError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use doi_resolver::{InputBatch, Resolver, ResolverConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), doi_resolver::ResolverError> {
//! let resolver = Resolver::new(ResolverConfig::default())?;
//! let batches = vec![InputBatch {
//!     source: "papers.csv".to_string(),
//!     tokens: vec!["https://doi.org/10.1000/xyz".to_string()],
//! }];
//! let results = resolver.run(batches, None, CancellationToken::new()).await;
//! for record in results.iter() {
//!     println!("{}: {:?}", record.id, record.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod client;
pub mod config;
pub mod date;
pub mod doi;
pub mod error;
pub mod limiter;
pub mod outcome;
pub mod retry;
pub mod scheduler;
pub mod source;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

pub use aggregate::aggregate;
pub use client::CrossrefClient;
pub use config::ResolverConfig;
pub use date::{DatePrecision, DateRange, ParseYearMonthError, ResolvedDate, YearMonth};
pub use doi::{Doi, InvalidDoi};
pub use error::ResolverError;
pub use limiter::RateLimiter;
pub use outcome::{FatalCause, LookupOutcome, ResolutionRecord, ResultSet, TransientCause};
pub use retry::{resolve_with_retry, RetryPolicy};
pub use scheduler::{resolve_all, ProgressFn};
pub use source::DateSource;

/// One input file's worth of raw identifier tokens.
#[derive(Debug, Clone)]
pub struct InputBatch {
    /// Label carried into each record for traceability (e.g. file name).
    pub source: String,
    /// Raw tokens as read from the input; normalization happens here.
    pub tokens: Vec<String>,
}

/// Facade running the whole pipeline: normalize → deduplicate → schedule →
/// aggregate. Owns the run's lookup source; all other state is per-run.
pub struct Resolver {
    config: ResolverConfig,
    source: Arc<dyn DateSource>,
}

impl Resolver {
    /// Builds a resolver backed by the real Crossref client.
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        config.validate()?;
        let source = Arc::new(CrossrefClient::new(&config)?);
        Ok(Self { config, source })
    }

    /// Builds a resolver over an arbitrary [`DateSource`]; the seam tests
    /// use to drive the pipeline without a network.
    pub fn with_source(
        config: ResolverConfig,
        source: Arc<dyn DateSource>,
    ) -> Result<Self, ResolverError> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves every token in every batch, returning the merged result set.
    ///
    /// Each unique DOI is looked up exactly once even when it appears in
    /// several batches; tokens that fail normalization become
    /// [`LookupOutcome::InvalidIdentifier`] records keyed by the trimmed raw
    /// token. Progress reports `(completed, total unique DOIs)`.
    pub async fn run(
        &self,
        batches: Vec<InputBatch>,
        progress: Option<ProgressFn>,
        cancel: CancellationToken,
    ) -> ResultSet {
        let parsed: Vec<(String, Vec<Result<Doi, InvalidDoi>>)> = batches
            .into_iter()
            .map(|batch| {
                let tokens = batch
                    .tokens
                    .iter()
                    .map(|token| Doi::parse(token))
                    .collect();
                (batch.source, tokens)
            })
            .collect();

        let mut unique: Vec<Doi> = Vec::new();
        let mut seen: HashSet<Doi> = HashSet::new();
        for (_, tokens) in &parsed {
            for doi in tokens.iter().flatten() {
                if seen.insert(doi.clone()) {
                    unique.push(doi.clone());
                }
            }
        }
        info!(
            batches = parsed.len(),
            unique = unique.len(),
            "starting run"
        );

        let outcomes: HashMap<Doi, LookupOutcome> = resolve_all(
            unique,
            Arc::clone(&self.source),
            RetryPolicy::new(
                self.config.max_attempts,
                self.config.base_delay,
                self.config.max_delay,
            ),
            self.config.concurrency,
            progress,
            cancel,
        )
        .await
        .into_iter()
        .collect();

        let record_batches = parsed.into_iter().map(|(source, tokens)| {
            let records = tokens
                .into_iter()
                .map(|token| match token {
                    Ok(doi) => {
                        let outcome = outcomes
                            .get(&doi)
                            .cloned()
                            .unwrap_or(LookupOutcome::Cancelled);
                        (doi.as_str().to_string(), outcome)
                    }
                    Err(invalid) => (invalid.raw, LookupOutcome::InvalidIdentifier),
                })
                .collect();
            (source, records)
        });
        aggregate(record_batches)
    }
}
