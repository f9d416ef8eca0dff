//! Error types shared across the race services
//!
//! Stream and processing errors live with the crates that raise them; this
//! module covers the startup inputs every service loads.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure loading a startup input (race config or competitor lookup)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("race.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Failed to read race.json: missing");
    }
}
