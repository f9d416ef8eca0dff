//! Result aggregation
//!
//! Folds start, finish and place events into one `RaceResult` per bib.
//! Finish and place fields are guarded by source rank; the start time is
//! not. Every change that leaves a result publishable is sent to the sink
//! in the order it happened.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use event_stream::{EventReader, ResultSink, StreamError};
use race_types::{
    Bib, CompetitorLookup, EventData, FinishEvent, PlaceEvent, RaceEvent, RaceResult, SourceRanks, StartEvent,
};

use crate::place_index::{Assignment, PlaceIndex};

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Failed to read event: {0}")]
    Read(#[source] StreamError),

    #[error("Failed to publish result for bib {bib}: {source}")]
    Sink {
        bib: Bib,
        #[source]
        source: StreamError,
    },
}

// ── Stats ───────────────────────────────────────────────────────────

/// Counters for one processing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorStats {
    pub events_read: u64,
    pub results_emitted: u64,
    /// Events for the sentinel bib or a bib missing from the lookup
    pub unknown_bibs: u64,
    pub rank_rejections: u64,
    pub invalid_places: u64,
}

// ── Aggregator ──────────────────────────────────────────────────────

pub struct ResultAggregator {
    ranks: SourceRanks,
    athletes: CompetitorLookup,
    results: BTreeMap<Bib, RaceResult>,
    places: PlaceIndex,
    /// Most recently accepted raw finish per bib
    raw_finishes: BTreeMap<Bib, DateTime<Utc>>,
    start_time: Option<DateTime<Utc>>,
    stats: AggregatorStats,
}

impl ResultAggregator {
    pub fn new(ranks: SourceRanks, athletes: CompetitorLookup) -> Self {
        Self {
            ranks,
            athletes,
            results: BTreeMap::new(),
            places: PlaceIndex::new(),
            raw_finishes: BTreeMap::new(),
            start_time: None,
            stats: AggregatorStats::default(),
        }
    }

    pub fn stats(&self) -> AggregatorStats {
        self.stats
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn result(&self, bib: Bib) -> Option<&RaceResult> {
        self.results.get(&bib)
    }

    /// All results, ascending by bib
    pub fn results(&self) -> impl Iterator<Item = &RaceResult> {
        self.results.values()
    }

    pub fn place_index(&self) -> &PlaceIndex {
        &self.places
    }

    /// Fold one event, sending every resulting emission to `sink`
    pub fn apply<S: ResultSink + ?Sized>(&mut self, event: &RaceEvent, sink: &mut S) -> Result<(), AggregatorError> {
        match &event.data {
            EventData::Start(start) => self.apply_start(start, sink),
            EventData::Finish(finish) => self.apply_finish(finish, sink),
            EventData::Place(place) => self.apply_place(place, sink),
        }
    }

    /// Consume `reader` until it yields no event
    pub fn run<R, S>(&mut self, reader: &mut R, sink: &mut S, timeout: Duration) -> Result<AggregatorStats, AggregatorError>
    where
        R: EventReader + ?Sized,
        S: ResultSink + ?Sized,
    {
        info!(athletes = self.athletes.len(), ranks = self.ranks.len(), "Result aggregator started");

        while let Some(event) = reader.read_next(timeout).map_err(AggregatorError::Read)? {
            self.stats.events_read += 1;
            self.apply(&event, sink)?;
        }

        info!(
            events_read = self.stats.events_read,
            results_emitted = self.stats.results_emitted,
            unknown_bibs = self.stats.unknown_bibs,
            rank_rejections = self.stats.rank_rejections,
            "Result aggregator stopped"
        );
        Ok(self.stats)
    }

    fn apply_start<S: ResultSink + ?Sized>(&mut self, start: &StartEvent, sink: &mut S) -> Result<(), AggregatorError> {
        self.start_time = Some(start.start_time);
        debug!(source = %start.source, start_time = %start.start_time, "Start time set");

        let finished: Vec<(Bib, DateTime<Utc>)> = self.raw_finishes.iter().map(|(b, t)| (*b, *t)).collect();
        for (bib, finish_time) in finished {
            if let Some(result) = self.results.get_mut(&bib) {
                result.elapsed_time = Some(finish_time - start.start_time);
            }
            self.emit(bib, sink)?;
        }
        Ok(())
    }

    fn apply_finish<S: ResultSink + ?Sized>(&mut self, finish: &FinishEvent, sink: &mut S) -> Result<(), AggregatorError> {
        let Some(result) = known_result(&mut self.results, &self.athletes, finish.bib) else {
            self.stats.unknown_bibs += 1;
            warn!(bib = %finish.bib, source = %finish.source, "Skipping finish for unknown bib");
            return Ok(());
        };

        if !self.ranks.accepts_field_update(&finish.source, result.finish_source.as_ref()) {
            self.stats.rank_rejections += 1;
            debug!(bib = %finish.bib, source = %finish.source, "Finish rejected by rank");
            return Ok(());
        }

        result.finish_source = Some(finish.source.clone());
        if let Some(start) = self.start_time {
            result.elapsed_time = Some(finish.finish_time - start);
        }
        self.raw_finishes.insert(finish.bib, finish.finish_time);

        self.emit(finish.bib, sink)
    }

    fn apply_place<S: ResultSink + ?Sized>(&mut self, event: &PlaceEvent, sink: &mut S) -> Result<(), AggregatorError> {
        if event.place == 0 {
            self.stats.invalid_places += 1;
            warn!(bib = %event.bib, source = %event.source, "Skipping place 0");
            return Ok(());
        }
        let Some(result) = known_result(&mut self.results, &self.athletes, event.bib) else {
            self.stats.unknown_bibs += 1;
            warn!(bib = %event.bib, source = %event.source, "Skipping place for unknown bib");
            return Ok(());
        };

        if !self.ranks.accepts_field_update(&event.source, result.place_source.as_ref()) {
            self.stats.rank_rejections += 1;
            debug!(bib = %event.bib, source = %event.source, "Place rejected by rank");
            return Ok(());
        }
        result.place_source = Some(event.source.clone());
        let current = result.place;

        match current {
            None => {
                let moved = self.places.insert(event.bib, event.place);
                self.sync_places(&moved);
                debug!(bib = %event.bib, place = event.place, shifted = moved.len() - 1, "Place inserted");
                self.emit(event.bib, sink)
            }
            Some(previous) => {
                let ((from, to), moved) = self.places.relocate(previous, event.place);
                self.sync_places(&moved);
                debug!(bib = %event.bib, previous, place = event.place, from, to, "Place moved");

                for (_, bib) in self.places.range(from, to) {
                    self.emit(bib, sink)?;
                }
                Ok(())
            }
        }
    }

    fn sync_places(&mut self, moved: &[Assignment]) {
        for (place, bib) in moved {
            if let Some(result) = self.results.get_mut(bib) {
                result.place = Some(*place);
            }
        }
    }

    fn emit<S: ResultSink + ?Sized>(&mut self, bib: Bib, sink: &mut S) -> Result<(), AggregatorError> {
        let Some(result) = self.results.get(&bib) else {
            return Ok(());
        };
        if !result.is_publishable() {
            return Ok(());
        }
        sink.send_result(result)
            .map_err(|source| AggregatorError::Sink { bib, source })?;
        self.stats.results_emitted += 1;
        Ok(())
    }
}

/// Get-or-create the result for a bib the lookup knows
fn known_result<'a>(
    results: &'a mut BTreeMap<Bib, RaceResult>,
    athletes: &CompetitorLookup,
    bib: Bib,
) -> Option<&'a mut RaceResult> {
    let athlete = athletes.resolve(bib)?;
    Some(results.entry(bib).or_insert_with(|| RaceResult::new(bib, Some(athlete))))
}
