//! Source trust ranking
//!
//! Lower rank = more trusted. A source missing from the table has rank 0
//! ("no rank configured").
//!
//! Two acceptance rules are built on the table and they are deliberately
//! different:
//! - `accepts_field_update`: used by the result aggregator for the finish and
//!   place fields of a result. Equal rank overwrites, and a field whose
//!   current source has rank 0 accepts any candidate.
//! - `is_better_finish`: used by the placer when choosing the best finish per
//!   bib. Only a strictly better rank replaces a cached finish.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::SourceId;

/// Rank of a source with no configured entry
pub const UNRANKED: i32 = 0;

/// Static source -> rank table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRanks(HashMap<SourceId, i32>);

impl SourceRanks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, source: impl Into<SourceId>, rank: i32) -> Self {
        self.0.insert(source.into(), rank);
        self
    }

    pub fn insert(&mut self, source: impl Into<SourceId>, rank: i32) {
        self.0.insert(source.into(), rank);
    }

    /// Configured rank, or `UNRANKED` on a miss
    pub fn rank(&self, source: &SourceId) -> i32 {
        self.0.get(source).copied().unwrap_or(UNRANKED)
    }

    fn rank_of(&self, source: Option<&SourceId>) -> i32 {
        source.map_or(UNRANKED, |s| self.rank(s))
    }

    /// Field resolution for aggregated results
    ///
    /// `current` is the source that last set the field, `None` if unset.
    pub fn accepts_field_update(&self, candidate: &SourceId, current: Option<&SourceId>) -> bool {
        let current_rank = self.rank_of(current);
        current_rank == UNRANKED || self.rank(candidate) <= current_rank
    }

    /// Finish selection for place derivation
    ///
    /// `cached` is the source of the finish currently held for the bib,
    /// `None` if no finish is cached yet.
    pub fn is_better_finish(&self, candidate: &SourceId, cached: Option<&SourceId>) -> bool {
        match cached {
            None => true,
            Some(cached) => self.rank(candidate) < self.rank(cached),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<SourceId>> FromIterator<(S, i32)> for SourceRanks {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(s, r)| (s.into(), r)).collect())
    }
}
