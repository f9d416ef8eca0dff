//! Event Stream — ordered, append-only race event logs
//!
//! Producers append start, finish and place events; consumers read them
//! back in id order, either one at a time (optionally blocking for new
//! appends) or as bounded ranges. Results flow out through `ResultSink`.
//!
//! # Modules
//! - `log`: reader/writer/sink traits and range paging
//! - `memory`: shared in-process log and an in-memory result sink
//! - `codec`: JSON wire encoding of events
//! - `jsonl`: newline-delimited JSON files

pub mod codec;
pub mod error;
pub mod jsonl;
pub mod log;
pub mod memory;

pub use error::StreamError;
pub use jsonl::{JsonLinesLog, JsonLinesWriter};
pub use log::{read_all_pages, EventReader, EventWriter, RangeEnd, RangeStart, ResultSink};
pub use memory::{LogCursor, MemoryLog, MemoryResultSink};
