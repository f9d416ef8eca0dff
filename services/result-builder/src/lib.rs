//! Result Builder
//!
//! Merges start, finish and place events into per-bib race results,
//! resolving conflicting sources by trust rank and renumbering places as
//! placements change.
//!
//! # Modules
//! - `place_index`: place slot arena
//! - `aggregator`: the fold step and the processing loop
//! - `replay`: double-replay determinism check

pub mod aggregator;
pub mod place_index;
pub mod replay;

pub use aggregator::{AggregatorError, AggregatorStats, ResultAggregator};
pub use place_index::PlaceIndex;
pub use replay::{replay_events, results_digest, ReplayReport, ReplayVerifier};
