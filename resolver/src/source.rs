//! The lookup seam.
//!
//! The scheduler and retry policy only ever see this trait; the Crossref
//! client implements it for production and tests substitute scripted stubs.

use async_trait::async_trait;

use crate::doi::Doi;
use crate::outcome::LookupOutcome;

/// A single-attempt date lookup for one identifier.
///
/// Implementations never retry and never panic on remote misbehavior; every
/// failure mode maps to a [`LookupOutcome`] variant.
#[async_trait]
pub trait DateSource: Send + Sync {
    async fn lookup(&self, doi: &Doi) -> LookupOutcome;
}
