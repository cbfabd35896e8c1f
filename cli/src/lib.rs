//! CLI support library: CSV ingestion, report writing, errors.
//!
//! The binary in `main.rs` wires these onto the engine; everything here is
//! plain synchronous I/O so it stays trivially testable.

mod error;
mod ingest;
mod output;

pub use error::CliError;
pub use ingest::{find_doi_column, read_batch};
pub use output::{print_summary, status_label, timestamped_name, write_csv};
