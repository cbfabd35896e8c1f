//! Report rendering: CSV files and the terminal summary.

use std::path::{Path, PathBuf};

use chrono::Local;
use doi_resolver::{LookupOutcome, ResultSet};

use crate::error::CliError;

/// Default output file name, timestamped like `doi_dates_full_20240131_120000.csv`.
pub fn timestamped_name(kind: &str) -> PathBuf {
    PathBuf::from(format!(
        "doi_dates_{kind}_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Short machine-friendly status for the report's `status` column.
pub fn status_label(outcome: &LookupOutcome) -> &'static str {
    match outcome {
        LookupOutcome::Resolved(_) => "resolved",
        LookupOutcome::NotFound => "not_found",
        LookupOutcome::InvalidIdentifier => "invalid_doi",
        LookupOutcome::TransientError(_) => "transient_error",
        LookupOutcome::FatalError(_) => "error",
        LookupOutcome::Cancelled => "cancelled",
    }
}

fn detail(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::TransientError(cause) => cause.to_string(),
        LookupOutcome::FatalError(cause) => cause.to_string(),
        _ => String::new(),
    }
}

/// Writes a result set as CSV: resolved rows first in date order, then the
/// rest in display order, so the report reads as a timeline with failures
/// appended.
pub fn write_csv(path: &Path, results: &ResultSet) -> Result<(), CliError> {
    let csv_err = |err| CliError::Csv {
        path: path.display().to_string(),
        source: err,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["doi", "source", "status", "created_date", "detail"])
        .map_err(csv_err)?;

    let mut resolved: Vec<_> = results
        .iter()
        .filter(|record| record.outcome.resolved().is_some())
        .collect();
    resolved.sort_by_key(|record| record.outcome.resolved().map(|date| date.sort_key()));
    let unresolved = results
        .iter()
        .filter(|record| record.outcome.resolved().is_none());

    for record in resolved.into_iter().chain(unresolved) {
        let date = record
            .outcome
            .resolved()
            .map(|date| date.to_string())
            .unwrap_or_default();
        writer
            .write_record([
                record.id.as_str(),
                record.source.as_str(),
                status_label(&record.outcome),
                date.as_str(),
                detail(&record.outcome).as_str(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|err| CliError::Io {
        path: path.display().to_string(),
        source: err,
    })?;
    Ok(())
}

/// Prints the run summary the way the original report did: processed / with
/// dates / without.
pub fn print_summary(results: &ResultSet) {
    let found = results
        .iter()
        .filter(|record| record.outcome.resolved().is_some())
        .count();
    println!("DOIs processed: {}", results.len());
    println!("dates found: {found}");
    println!("without dates: {}", results.len() - found);
}

#[cfg(test)]
mod tests {
    use super::*;
    use doi_resolver::{aggregate, ResolvedDate};

    fn sample() -> ResultSet {
        let resolved = |y, m| {
            LookupOutcome::Resolved(ResolvedDate::from_date_parts(&[y, m]).unwrap())
        };
        aggregate([(
            "a.csv".to_string(),
            vec![
                ("10.1/late".to_string(), resolved(2021, 6)),
                ("10.1/early".to_string(), resolved(2019, 2)),
                ("10.1/missing".to_string(), LookupOutcome::NotFound),
                ("bogus".to_string(), LookupOutcome::InvalidIdentifier),
            ],
        )])
    }

    #[test]
    fn writes_resolved_rows_in_date_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_csv(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "doi,source,status,created_date,detail");
        assert!(lines[1].starts_with("10.1/early,a.csv,resolved,2019-02"));
        assert!(lines[2].starts_with("10.1/late,a.csv,resolved,2021-06"));
        assert!(lines[3].starts_with("10.1/missing,a.csv,not_found,"));
        assert!(lines[4].starts_with("bogus,a.csv,invalid_doi,"));
    }

    #[test]
    fn year_only_dates_render_bare_year() {
        let year_only = LookupOutcome::Resolved(ResolvedDate::from_date_parts(&[2020]).unwrap());
        let set = aggregate([(
            "a.csv".to_string(),
            vec![("10.1/yearly".to_string(), year_only)],
        )]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_csv(&path, &set).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("10.1/yearly,a.csv,resolved,2020,"));
    }

    #[test]
    fn timestamped_names_carry_the_kind() {
        let name = timestamped_name("filtered");
        let name = name.to_string_lossy();
        assert!(name.starts_with("doi_dates_filtered_"));
        assert!(name.ends_with(".csv"));
    }
}
