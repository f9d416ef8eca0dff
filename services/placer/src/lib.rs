//! Place Deriver
//!
//! Turns ranked, multi-source finish timestamps into a dense 1..N place
//! ordering. Each accepted finish re-sorts the known finishers and
//! re-emits places from the changed bib onward.
//!
//! # Modules
//! - `finish_cache`: best finish per bib, in arrival order
//! - `deriver`: the fold step and the processing loop

pub mod deriver;
pub mod finish_cache;

pub use deriver::{PlaceDeriver, PlacerError, PlacerStats};
pub use finish_cache::FinishCache;
