//! CSV ingestion: locate the DOI column and collect raw tokens.
//!
//! The engine never parses CSV; this module turns each input file into an
//! [`InputBatch`] of raw tokens and leaves normalization to the engine.

use std::path::Path;

use doi_resolver::InputBatch;
use tracing::debug;

use crate::error::CliError;

/// Reads one CSV file into a batch labeled with its file name.
///
/// The DOI column is `requested` when given, otherwise the first header
/// containing `doi` (case-insensitive). Blank cells and the literal `nan`
/// (pandas' missing-value spelling, common in exported sheets) are skipped.
pub fn read_batch(path: &Path, requested: Option<&str>) -> Result<InputBatch, CliError> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let csv_err = |source: &str| {
        let path = source.to_string();
        move |err| CliError::Csv { path, source: err }
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err(&source))?;
    let headers = reader.headers().map_err(csv_err(&source))?.clone();
    let column = find_doi_column(&headers, requested).ok_or_else(|| CliError::NoDoiColumn {
        path: source.clone(),
    })?;
    debug!(file = %source, column, header = headers.get(column).unwrap_or(""), "reading DOI column");

    let mut tokens = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err(&source))?;
        let Some(cell) = row.get(column) else { continue };
        let cell = cell.trim();
        if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
            continue;
        }
        tokens.push(cell.to_string());
    }
    Ok(InputBatch { source, tokens })
}

/// Index of the DOI column: an exact (case-insensitive) match for
/// `requested`, or the first header containing `doi`.
pub fn find_doi_column(headers: &csv::StringRecord, requested: Option<&str>) -> Option<usize> {
    match requested {
        Some(name) => headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name)),
        None => headers
            .iter()
            .position(|header| header.to_ascii_lowercase().contains("doi")),
    }
}
