use race_types::EventId;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A stored frame could not be decoded. Readers cannot advance past it.
    #[error("Failed to decode event {id}: {reason}")]
    Decode { id: EventId, reason: String },

    #[error("Failed to encode: {0}")]
    Encode(String),

    #[error("Log is closed for appends")]
    Closed,

    #[error("Range read requested with a zero-sized buffer")]
    EmptyRangeBuffer,
}
