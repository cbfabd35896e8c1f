//! CLI-side failures: bad input files, missing columns, unwritable output.
//!
//! These never pass through the engine; the engine reports per-identifier
//! trouble as data and only fails fast on invalid configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("{path}: no DOI column found (override with --column)")]
    NoDoiColumn { path: String },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Resolver(#[from] doi_resolver::ResolverError),
}
