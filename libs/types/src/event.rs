//! Race event types
//!
//! Every event carries the source that produced it. The three payloads are:
//! - `StartEvent`: race clock zero
//! - `FinishEvent`: a finish-line crossing, possibly without a readable bib
//! - `PlaceEvent`: a 1-based finishing position for a bib
//!
//! Events are immutable once appended to a log. The log assigns the
//! `EventId`; the wire encoding lives in the `event-stream` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Bib, EventId, SourceId};

/// Race clock zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartEvent {
    pub source: SourceId,
    pub start_time: DateTime<Utc>,
}

/// Finish-line crossing
///
/// `bib` may be `Bib::NO_BIB` when the crossing was detected but the
/// competitor could not be identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishEvent {
    pub source: SourceId,
    pub bib: Bib,
    pub finish_time: DateTime<Utc>,
}

/// Finishing position for a bib (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceEvent {
    pub source: SourceId,
    pub bib: Bib,
    pub place: u32,
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventData {
    Start(StartEvent),
    Finish(FinishEvent),
    Place(PlaceEvent),
}

impl EventData {
    /// Source that produced the payload
    pub fn source(&self) -> &SourceId {
        match self {
            EventData::Start(e) => &e.source,
            EventData::Finish(e) => &e.source,
            EventData::Place(e) => &e.source,
        }
    }

    /// Short type label, used on the wire and in logs
    pub fn type_label(&self) -> &'static str {
        match self {
            EventData::Start(_) => "start",
            EventData::Finish(_) => "finish",
            EventData::Place(_) => "place",
        }
    }
}

impl From<StartEvent> for EventData {
    fn from(e: StartEvent) -> Self {
        EventData::Start(e)
    }
}

impl From<FinishEvent> for EventData {
    fn from(e: FinishEvent) -> Self {
        EventData::Finish(e)
    }
}

impl From<PlaceEvent> for EventData {
    fn from(e: PlaceEvent) -> Self {
        EventData::Place(e)
    }
}

/// An event as stored in, and read from, a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceEvent {
    /// Log position
    pub id: EventId,
    /// When the event was recorded
    pub event_time: DateTime<Utc>,
    pub data: EventData,
}

impl RaceEvent {
    pub fn new(id: EventId, event_time: DateTime<Utc>, data: impl Into<EventData>) -> Self {
        Self {
            id,
            event_time,
            data: data.into(),
        }
    }

    pub fn source(&self) -> &SourceId {
        self.data.source()
    }

    pub fn type_label(&self) -> &'static str {
        self.data.type_label()
    }
}

impl StartEvent {
    pub fn new(source: impl Into<SourceId>, start_time: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            start_time,
        }
    }
}

impl FinishEvent {
    pub fn new(source: impl Into<SourceId>, bib: impl Into<Bib>, finish_time: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            bib: bib.into(),
            finish_time,
        }
    }
}

impl PlaceEvent {
    pub fn new(source: impl Into<SourceId>, bib: impl Into<Bib>, place: u32) -> Self {
        Self {
            source: source.into(),
            bib: bib.into(),
            place,
        }
    }
}
