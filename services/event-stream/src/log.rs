//! Reader, writer and sink interfaces
//!
//! Consumers only ever see these traits, so the same processing code runs
//! against an in-process `MemoryLog` or a log loaded from a JSON-lines file.

use chrono::{DateTime, Utc};
use std::time::Duration;

use race_types::{EventData, EventId, RaceEvent, RaceResult};

use crate::error::StreamError;

/// Exclusive lower bound of a range read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStart {
    Beginning,
    /// Events strictly after this id
    After(EventId),
}

/// Inclusive upper bound of a range read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// Everything stored at the time of the call
    Present,
    Through(EventId),
}

impl RangeStart {
    pub(crate) fn excludes_through(&self) -> u64 {
        match self {
            RangeStart::Beginning => 0,
            RangeStart::After(id) => id.value(),
        }
    }
}

impl RangeEnd {
    pub(crate) fn includes(&self, id: EventId) -> bool {
        match self {
            RangeEnd::Present => true,
            RangeEnd::Through(end) => id <= *end,
        }
    }
}

/// Ordered event consumption
pub trait EventReader {
    /// Next unread event in id order.
    ///
    /// `Duration::ZERO` blocks until an event arrives or the log is closed.
    /// A positive timeout returns `Ok(None)` once it elapses. `Ok(None)` is
    /// also returned at the end of a closed log.
    fn read_next(&mut self, timeout: Duration) -> Result<Option<RaceEvent>, StreamError>;

    /// Up to `max_count` events in `(start, end]`, ascending.
    ///
    /// Does not move the `read_next` position. A zero `max_count` is an error.
    fn read_range(&self, start: RangeStart, end: RangeEnd, max_count: usize) -> Result<Vec<RaceEvent>, StreamError>;
}

/// Event production
pub trait EventWriter {
    /// Append an event; the log assigns its id
    fn append(&mut self, event_time: DateTime<Utc>, data: EventData) -> Result<EventId, StreamError>;
}

/// Destination for published results
pub trait ResultSink {
    fn send_result(&mut self, result: &RaceResult) -> Result<(), StreamError>;
}

impl<T: EventReader + ?Sized> EventReader for &mut T {
    fn read_next(&mut self, timeout: Duration) -> Result<Option<RaceEvent>, StreamError> {
        (**self).read_next(timeout)
    }

    fn read_range(&self, start: RangeStart, end: RangeEnd, max_count: usize) -> Result<Vec<RaceEvent>, StreamError> {
        (**self).read_range(start, end, max_count)
    }
}

impl<T: EventWriter + ?Sized> EventWriter for &mut T {
    fn append(&mut self, event_time: DateTime<Utc>, data: EventData) -> Result<EventId, StreamError> {
        (**self).append(event_time, data)
    }
}

impl<T: ResultSink + ?Sized> ResultSink for &mut T {
    fn send_result(&mut self, result: &RaceResult) -> Result<(), StreamError> {
        (**self).send_result(result)
    }
}

/// Read every stored event by paging through `read_range`
pub fn read_all_pages<R: EventReader + ?Sized>(reader: &R, page_size: usize) -> Result<Vec<RaceEvent>, StreamError> {
    let mut events = Vec::new();
    let mut start = RangeStart::Beginning;

    loop {
        let page = reader.read_range(start, RangeEnd::Present, page_size)?;
        let Some(last) = page.last() else {
            break;
        };
        start = RangeStart::After(last.id);
        let short_page = page.len() < page_size;
        events.extend(page);
        if short_page {
            break;
        }
    }

    Ok(events)
}
