//! DOI normalization and validation.
//!
//! Raw tokens from input files arrive in many shapes: resolver URLs
//! (`https://doi.org/10.1000/xyz`), `doi:` prefixes, mixed case, stray
//! whitespace. [`Doi::parse`] folds all of these into one canonical form and
//! rejects anything that does not look like a `10.<registrant>/<suffix>`
//! identifier. Rejected tokens are never dispatched to the network.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// DOI grammar: registrant prefix (`10.` + 4-9 digits), slash, non-empty suffix.
static DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^10\.\d{4,9}/\S+$").expect("DOI pattern is valid")
});

/// Resolver wrappers commonly pasted into spreadsheets along with the DOI.
const RESOLVER_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// A token that could not be normalized into a DOI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid DOI: {raw:?}")]
pub struct InvalidDoi {
    /// The offending token, trimmed of surrounding whitespace.
    pub raw: String,
}

/// A normalized DOI: trimmed, prefix-stripped, lower-cased, grammar-checked.
///
/// DOIs are case-insensitive by definition; the canonical form here is lower
/// case so that `10.1000/XYZ` and `10.1000/xyz` deduplicate to one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Doi(String);

impl Doi {
    /// Normalizes a raw token into a [`Doi`], or rejects it.
    ///
    /// Pure and infallible in the panic sense: every input maps to either a
    /// canonical DOI or an [`InvalidDoi`] carrying the trimmed token.
    pub fn parse(raw: &str) -> Result<Self, InvalidDoi> {
        let mut token = raw.trim();
        for prefix in RESOLVER_PREFIXES {
            if let Some(head) = token.get(..prefix.len()) {
                if head.eq_ignore_ascii_case(prefix) {
                    token = &token[prefix.len()..];
                    break;
                }
            }
        }
        let canonical = token.to_lowercase();
        if DOI_RE.is_match(&canonical) {
            Ok(Doi(canonical))
        } else {
            Err(InvalidDoi {
                raw: raw.trim().to_string(),
            })
        }
    }

    /// The canonical identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Doi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
