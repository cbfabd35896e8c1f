//! Merging outcome batches into one result set.
//!
//! Uploading the same DOI in two files is routine, not an error: batches
//! merge last-write-wins, so the later file's record (and attribution) wins
//! while the row keeps its first-seen display position.

use crate::outcome::{LookupOutcome, ResolutionRecord, ResultSet};

/// Merges `(source label, outcomes)` batches into a [`ResultSet`].
///
/// Batches are applied in order; for identifiers appearing in more than one
/// batch the last batch's outcome and source label replace the earlier ones.
pub fn aggregate<I>(batches: I) -> ResultSet
where
    I: IntoIterator<Item = (String, Vec<(String, LookupOutcome)>)>,
{
    let mut set = ResultSet::new();
    for (source, outcomes) in batches {
        for (id, outcome) in outcomes {
            set.insert(ResolutionRecord {
                id,
                outcome,
                source: source.clone(),
            });
        }
    }
    set
}
