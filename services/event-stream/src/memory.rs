//! In-process event log
//!
//! `MemoryLog` is a cheap-to-clone handle on shared storage: writers and
//! any number of `LogCursor`s can live on different threads. Frames are
//! kept encoded and decoded on read, so a corrupt frame surfaces exactly
//! where a reader reaches it.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use race_types::{EventData, EventId, RaceEvent, RaceResult};

use crate::codec::{decode_event, encode_event};
use crate::error::StreamError;
use crate::log::{EventReader, EventWriter, RangeEnd, RangeStart, ResultSink};

// ── Storage ─────────────────────────────────────────────────────────

#[derive(Debug)]
struct Frame {
    id: EventId,
    payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct LogState {
    frames: Vec<Frame>,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<LogState>,
    appended: Condvar,
}

/// Shared append-only log. Ids start at 1 and are contiguous.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    shared: Arc<Shared>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    // Frames are only ever pushed, so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an already-encoded frame, e.g. a line read from a file
    pub fn append_raw(&self, payload: Vec<u8>) -> Result<EventId, StreamError> {
        let mut state = self.lock();
        if state.closed {
            return Err(StreamError::Closed);
        }
        let id = EventId::new(state.frames.len() as u64 + 1);
        state.frames.push(Frame { id, payload });
        drop(state);

        self.shared.appended.notify_all();
        Ok(id)
    }

    /// Encode and append an event, returning its assigned id
    pub fn append_event(&self, event_time: DateTime<Utc>, data: EventData) -> Result<EventId, StreamError> {
        let mut state = self.lock();
        if state.closed {
            return Err(StreamError::Closed);
        }
        let id = EventId::new(state.frames.len() as u64 + 1);
        let payload = encode_event(&RaceEvent {
            id,
            event_time,
            data,
        })?;
        state.frames.push(Frame { id, payload });
        drop(state);

        debug!(event_id = %id, "Event appended");
        self.shared.appended.notify_all();
        Ok(id)
    }

    /// Refuse further appends and wake blocked readers
    pub fn close(&self) {
        self.lock().closed = true;
        self.shared.appended.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id of the newest event, `None` when empty
    pub fn last_id(&self) -> Option<EventId> {
        self.lock().frames.last().map(|f| f.id)
    }

    /// Reader positioned before the first event
    pub fn cursor(&self) -> LogCursor {
        LogCursor {
            log: self.clone(),
            last_read: None,
        }
    }

    /// Reader positioned just after `id`
    pub fn cursor_after(&self, id: EventId) -> LogCursor {
        LogCursor {
            log: self.clone(),
            last_read: Some(id),
        }
    }

    fn range(&self, start: RangeStart, end: RangeEnd, max_count: usize) -> Result<Vec<RaceEvent>, StreamError> {
        if max_count == 0 {
            return Err(StreamError::EmptyRangeBuffer);
        }
        let state = self.lock();
        let first = start.excludes_through() as usize;
        state
            .frames
            .iter()
            .skip(first)
            .take_while(|f| end.includes(f.id))
            .take(max_count)
            .map(|f| decode_event(f.id, &f.payload))
            .collect()
    }
}

impl EventWriter for MemoryLog {
    fn append(&mut self, event_time: DateTime<Utc>, data: EventData) -> Result<EventId, StreamError> {
        self.append_event(event_time, data)
    }
}

// ── Cursor ──────────────────────────────────────────────────────────

/// Independent read position over a `MemoryLog`
#[derive(Debug, Clone)]
pub struct LogCursor {
    log: MemoryLog,
    last_read: Option<EventId>,
}

impl LogCursor {
    /// Id of the last event returned by `read_next`
    pub fn position(&self) -> Option<EventId> {
        self.last_read
    }

    /// Next frame, waiting per the `read_next` timeout contract
    fn next_frame(&self, timeout: Duration) -> Option<(EventId, Vec<u8>)> {
        let index = self.last_read.map_or(0, |id| id.value() as usize);
        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);
        let mut state = self.log.lock();

        loop {
            if let Some(frame) = state.frames.get(index) {
                return Some((frame.id, frame.payload.clone()));
            }
            if state.closed {
                return None;
            }
            state = match deadline {
                None => self
                    .log
                    .shared
                    .appended
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    self.log
                        .shared
                        .appended
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

impl EventReader for LogCursor {
    fn read_next(&mut self, timeout: Duration) -> Result<Option<RaceEvent>, StreamError> {
        let Some((id, payload)) = self.next_frame(timeout) else {
            return Ok(None);
        };
        let event = decode_event(id, &payload)?;
        self.last_read = Some(id);
        Ok(Some(event))
    }

    fn read_range(&self, start: RangeStart, end: RangeEnd, max_count: usize) -> Result<Vec<RaceEvent>, StreamError> {
        self.log.range(start, end, max_count)
    }
}

// ── Result Sink ─────────────────────────────────────────────────────

/// Collects published results in emission order
#[derive(Debug, Clone, Default)]
pub struct MemoryResultSink {
    results: Vec<RaceResult>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[RaceResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Hand back everything collected so far, leaving the sink empty
    pub fn drain(&mut self) -> Vec<RaceResult> {
        std::mem::take(&mut self.results)
    }

    pub fn into_results(self) -> Vec<RaceResult> {
        self.results
    }
}

impl ResultSink for MemoryResultSink {
    fn send_result(&mut self, result: &RaceResult) -> Result<(), StreamError> {
        self.results.push(result.clone());
        Ok(())
    }
}
