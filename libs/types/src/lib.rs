//! Types library for race event processing
//!
//! Core type definitions shared by the placer, the result builder and the
//! event stream plumbing.
//!
//! # Modules
//! - `ids`: Identifiers (Bib, SourceId, EventId)
//! - `event`: Start / Finish / Place events
//! - `athlete`: Athletes and the bib lookup
//! - `result`: Consolidated per-bib results
//! - `ranking`: Source trust ranks and the acceptance rules built on them
//! - `config`: Static race configuration
//! - `errors`: Startup input errors

pub mod ids;
pub mod event;
pub mod athlete;
pub mod result;
pub mod ranking;
pub mod config;
pub mod errors;

pub use athlete::{Athlete, CompetitorLookup};
pub use config::{RaceConfig, DEFAULT_PLACER_SOURCE};
pub use errors::ConfigError;
pub use event::{EventData, FinishEvent, PlaceEvent, RaceEvent, StartEvent};
pub use ids::{Bib, EventId, SourceId};
pub use ranking::{SourceRanks, UNRANKED};
pub use result::RaceResult;

pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::athlete::*;
    pub use crate::config::*;
    pub use crate::errors::*;
    pub use crate::event::*;
    pub use crate::ids::*;
    pub use crate::ranking::*;
    pub use crate::result::*;
}
