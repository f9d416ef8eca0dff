//! Identifier types for race entities
//!
//! Bibs identify competitors, source ids identify the origin of an event
//! (a timing mat, a manual operator, the placer), and event ids are log
//! positions assigned by the event log on append.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Competitor race number
///
/// Serialized as a bare integer. The wire value `-1` is the sentinel for a
/// finish that was detected without a readable bib.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bib(i32);

impl Bib {
    /// Finish detected, competitor unknown
    pub const NO_BIB: Bib = Bib(-1);

    /// Create a bib from its race number
    pub const fn new(number: i32) -> Self {
        Self(number)
    }

    /// Get the race number
    pub fn number(&self) -> i32 {
        self.0
    }

    /// True for a real competitor number (positive)
    pub fn is_known(&self) -> bool {
        self.0 > 0
    }
}

impl From<i32> for Bib {
    fn from(number: i32) -> Self {
        Self(number)
    }
}

impl fmt::Display for Bib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NO_BIB {
            f.write_str("no-bib")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Origin of an event (timing device, operator, or a deriving service)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Create a source id from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the source name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for SourceId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of an event in a log
///
/// Assigned by the log, strictly increasing per log, starting at 1.
/// Zero is never assigned and is used as "not yet stored".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub const fn new(position: u64) -> Self {
        Self(position)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id the log assigns after this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bib_sentinel_is_not_known() {
        assert!(!Bib::NO_BIB.is_known());
        assert!(!Bib::new(0).is_known());
        assert!(Bib::new(10).is_known());
    }

    #[test]
    fn test_bib_serializes_as_number() {
        let json = serde_json::to_string(&Bib::new(42)).unwrap();
        assert_eq!(json, "42");

        let sentinel: Bib = serde_json::from_str("-1").unwrap();
        assert_eq!(sentinel, Bib::NO_BIB);
    }

    #[test]
    fn test_bib_display() {
        assert_eq!(Bib::new(7).to_string(), "7");
        assert_eq!(Bib::NO_BIB.to_string(), "no-bib");
    }

    #[test]
    fn test_source_id_transparent() {
        let source = SourceId::from("chute-mat");
        assert_eq!(serde_json::to_string(&source).unwrap(), "\"chute-mat\"");
        assert_eq!(source.as_str(), "chute-mat");
    }

    #[test]
    fn test_event_id_ordering() {
        let first = EventId::new(1);
        assert!(first < first.next());
        assert_eq!(first.next().value(), 2);
    }
}
