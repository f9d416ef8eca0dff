//! Race configuration
//!
//! Loaded once at startup from a JSON file and never mutated during a
//! processing run. Older config files spell the rank table `SourceRanks`;
//! both spellings are accepted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;
use crate::ids::SourceId;
use crate::ranking::SourceRanks;

/// Source name stamped on derived place events unless configured otherwise
pub const DEFAULT_PLACER_SOURCE: &str = "placer";

/// Static per-race configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Race identifier, used for naming output streams
    #[serde(default)]
    pub race_name: String,
    /// Source -> trust rank
    #[serde(default, alias = "SourceRanks")]
    pub source_ranks: SourceRanks,
    /// Source id for place events written by the placer
    #[serde(default = "default_placer_source")]
    pub placer_source: SourceId,
}

fn default_placer_source() -> SourceId {
    SourceId::from(DEFAULT_PLACER_SOURCE)
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            race_name: String::new(),
            source_ranks: SourceRanks::default(),
            placer_source: default_placer_source(),
        }
    }
}

impl RaceConfig {
    /// Load the configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pretty JSON, the format `load` reads
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
