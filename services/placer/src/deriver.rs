//! Place derivation
//!
//! For every accepted finish the full ordering is rebuilt from the cache
//! and a place is emitted for the changed bib and every bib after it.
//! Bibs ahead of the changed one cannot have moved, so they are not
//! re-emitted.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use event_stream::{EventReader, EventWriter, StreamError};
use race_types::{Bib, CompetitorLookup, EventData, FinishEvent, PlaceEvent, RaceConfig, SourceId, SourceRanks};

use crate::finish_cache::FinishCache;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum PlacerError {
    #[error("Failed to read event: {0}")]
    Read(#[source] StreamError),

    #[error("Failed to write place event: {0}")]
    Write(#[source] StreamError),
}

// ── Stats ───────────────────────────────────────────────────────────

/// Counters for one processing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacerStats {
    pub events_read: u64,
    pub finishes_accepted: u64,
    /// Sentinel bib, or a bib missing from the competitor filter
    pub finishes_ignored: u64,
    pub finishes_rejected_by_rank: u64,
    pub places_emitted: u64,
}

// ── Deriver ─────────────────────────────────────────────────────────

pub struct PlaceDeriver {
    ranks: SourceRanks,
    source: SourceId,
    competitors: Option<CompetitorLookup>,
    cache: FinishCache,
    stats: PlacerStats,
}

impl PlaceDeriver {
    /// Deriver emitting places under `source`
    pub fn new(ranks: SourceRanks, source: impl Into<SourceId>) -> Self {
        Self {
            ranks,
            source: source.into(),
            competitors: None,
            cache: FinishCache::new(),
            stats: PlacerStats::default(),
        }
    }

    pub fn from_config(config: &RaceConfig) -> Self {
        Self::new(config.source_ranks.clone(), config.placer_source.clone())
    }

    /// Only place bibs registered in `lookup`
    pub fn with_competitors(mut self, lookup: CompetitorLookup) -> Self {
        self.competitors = Some(lookup);
        self
    }

    pub fn stats(&self) -> PlacerStats {
        self.stats
    }

    pub fn finishes(&self) -> &FinishCache {
        &self.cache
    }

    /// Fold one finish into the cache and return the places to emit
    pub fn apply_finish(&mut self, finish: &FinishEvent) -> Vec<PlaceEvent> {
        if !finish.bib.is_known() {
            self.stats.finishes_ignored += 1;
            debug!(source = %finish.source, "Ignoring finish without bib");
            return Vec::new();
        }
        if let Some(lookup) = &self.competitors {
            if !lookup.contains(finish.bib) {
                self.stats.finishes_ignored += 1;
                warn!(bib = %finish.bib, source = %finish.source, "Ignoring finish for unregistered bib");
                return Vec::new();
            }
        }
        if !self.cache.offer(finish, &self.ranks) {
            self.stats.finishes_rejected_by_rank += 1;
            debug!(bib = %finish.bib, source = %finish.source, "Finish rejected by rank");
            return Vec::new();
        }
        self.stats.finishes_accepted += 1;

        let ordering = self.cache.ordering();
        let Some(changed_at) = ordering.iter().position(|bib| *bib == finish.bib) else {
            return Vec::new();
        };

        let places: Vec<PlaceEvent> = ordering[changed_at..]
            .iter()
            .zip(changed_at as u32 + 1..)
            .map(|(bib, place)| PlaceEvent::new(self.source.clone(), *bib, place))
            .collect();

        debug!(
            bib = %finish.bib,
            place = changed_at + 1,
            emitted = places.len(),
            "Places derived"
        );
        places
    }

    /// Current place for a bib, 1-based
    pub fn place_of(&self, bib: Bib) -> Option<u32> {
        self.cache
            .ordering()
            .iter()
            .position(|b| *b == bib)
            .map(|i| i as u32 + 1)
    }

    /// Consume `reader` until it yields no event, writing derived places.
    ///
    /// Place events are stamped with the event time of the finish that
    /// produced them, so replaying a log reproduces the same output.
    pub fn run<R, W>(&mut self, reader: &mut R, writer: &mut W, timeout: Duration) -> Result<PlacerStats, PlacerError>
    where
        R: EventReader + ?Sized,
        W: EventWriter + ?Sized,
    {
        info!(source = %self.source, "Place deriver started");

        while let Some(event) = reader.read_next(timeout).map_err(PlacerError::Read)? {
            self.stats.events_read += 1;
            let EventData::Finish(finish) = &event.data else {
                continue;
            };
            for place in self.apply_finish(finish) {
                writer
                    .append(event.event_time, place.into())
                    .map_err(PlacerError::Write)?;
                self.stats.places_emitted += 1;
            }
        }

        info!(
            events_read = self.stats.events_read,
            finishes_accepted = self.stats.finishes_accepted,
            places_emitted = self.stats.places_emitted,
            "Place deriver stopped"
        );
        Ok(self.stats)
    }
}
