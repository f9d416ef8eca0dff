//! Newline-delimited JSON files
//!
//! Input logs are loaded whole into a closed `MemoryLog`, so a run over a
//! file ends cleanly when the last line has been read. Output is written
//! one record per line and flushed after every record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use race_types::{EventData, EventId, RaceEvent, RaceResult};

use crate::codec::encode_event;
use crate::error::StreamError;
use crate::log::{EventWriter, ResultSink};
use crate::memory::MemoryLog;

/// Loader for event log files
pub struct JsonLinesLog;

impl JsonLinesLog {
    /// Load every non-blank line as a frame, then close the log.
    ///
    /// Lines are not decoded here: a malformed line fails the reader that
    /// reaches it.
    pub fn load(path: impl AsRef<Path>) -> Result<MemoryLog, StreamError> {
        let path = path.as_ref();
        let log = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), events = log.len(), "Event log loaded");
        Ok(log)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<MemoryLog, StreamError> {
        let log = MemoryLog::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            log.append_raw(line.into_bytes())?;
        }
        log.close();
        Ok(log)
    }
}

/// Line-per-record writer for events and results
pub struct JsonLinesWriter<W: Write> {
    out: BufWriter<W>,
    next_id: EventId,
    records_written: u64,
}

impl JsonLinesWriter<File> {
    /// Create (or truncate) an output file
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            next_id: EventId::new(1),
            records_written: 0,
        }
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    fn write_line(&mut self, line: &[u8]) -> Result<(), StreamError> {
        self.out.write_all(line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.records_written += 1;
        Ok(())
    }

    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), StreamError> {
        let line = serde_json::to_vec(record).map_err(|e| StreamError::Encode(e.to_string()))?;
        self.write_line(&line)
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, StreamError> {
        self.out.into_inner().map_err(|e| StreamError::Io(e.into_error()))
    }
}

impl<W: Write> EventWriter for JsonLinesWriter<W> {
    fn append(&mut self, event_time: DateTime<Utc>, data: EventData) -> Result<EventId, StreamError> {
        let id = self.next_id;
        let frame = encode_event(&RaceEvent { id, event_time, data })?;
        self.write_line(&frame)?;
        self.next_id = id.next();
        Ok(id)
    }
}

impl<W: Write> ResultSink for JsonLinesWriter<W> {
    fn send_result(&mut self, result: &RaceResult) -> Result<(), StreamError> {
        self.write_record(result)
    }
}
