//! Publication dates with variable precision, plus range filtering.
//!
//! Crossref reports creation dates as `date-parts`: sometimes a full date,
//! sometimes year+month, sometimes a bare year. The engine normalizes output
//! down to year-month but keeps the original precision so a bare year is not
//! silently promoted to January.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How much of the date the remote record actually carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePrecision {
    Year,
    YearMonth,
    YearMonthDay,
}

/// A calendar year-month, ordered chronologically. Used for range bounds and
/// as the sort key of resolved records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Builds a year-month, rejecting out-of-range months.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error parsing a `YYYY-MM` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected YYYY-MM, got {raw:?}")]
pub struct ParseYearMonthError {
    pub raw: String,
}

impl std::str::FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = || ParseYearMonthError { raw: s.to_string() };
        let (year, month) = s.split_once('-').ok_or_else(reject)?;
        let year: i32 = year.parse().map_err(|_| reject())?;
        let month: u32 = month.parse().map_err(|_| reject())?;
        YearMonth::new(year, month).ok_or_else(reject)
    }
}

/// A resolved creation date, normalized to year-month with a precision tag.
///
/// `month` is `None` exactly when precision is [`DatePrecision::Year`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDate {
    pub year: i32,
    pub month: Option<u32>,
    pub precision: DatePrecision,
}

impl ResolvedDate {
    /// Builds a date from one Crossref `date-parts` entry (`[y]`, `[y, m]`
    /// or `[y, m, d]`). Returns `None` for empty or out-of-range parts.
    pub fn from_date_parts(parts: &[i64]) -> Option<Self> {
        let year = i32::try_from(*parts.first()?).ok()?;
        match parts {
            [_] => Some(Self {
                year,
                month: None,
                precision: DatePrecision::Year,
            }),
            [_, m, rest @ ..] => {
                let month = u32::try_from(*m).ok().filter(|m| (1..=12).contains(m))?;
                let precision = if rest.is_empty() {
                    DatePrecision::YearMonth
                } else {
                    DatePrecision::YearMonthDay
                };
                Some(Self {
                    year,
                    month: Some(month),
                    precision,
                })
            }
            [] => None,
        }
    }

    /// Year-month used for chronological sorting; year-only dates sort as
    /// January of their year.
    pub fn sort_key(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month.unwrap_or(1),
        }
    }
}

impl std::fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.month {
            Some(month) => write!(f, "{:04}-{:02}", self.year, month),
            None => write!(f, "{:04}", self.year),
        }
    }
}

/// Inclusive year-month bounds; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a resolved date falls inside the range.
    ///
    /// A year-precision date is treated as the whole span January..December
    /// of its year and matches if that span overlaps the range at all.
    pub fn contains(&self, date: &ResolvedDate) -> bool {
        let (earliest, latest) = match date.month {
            Some(month) => {
                let ym = YearMonth {
                    year: date.year,
                    month,
                };
                (ym, ym)
            }
            None => (
                YearMonth {
                    year: date.year,
                    month: 1,
                },
                YearMonth {
                    year: date.year,
                    month: 12,
                },
            ),
        };
        self.start.is_none_or(|start| latest >= start)
            && self.end.is_none_or(|end| earliest <= end)
    }
}
