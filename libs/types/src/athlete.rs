//! Athletes and the bib -> athlete lookup
//!
//! The lookup is supplied fully populated before processing starts and is
//! never mutated by the processing components. A miss means "skip this
//! event", not an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::errors::ConfigError;
use crate::ids::Bib;

/// A registered competitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    /// External registration id
    #[serde(default)]
    pub da_id: String,
    pub first_name: String,
    pub last_name: String,
    pub team: String,
    #[serde(default)]
    pub grade: u32,
    #[serde(default)]
    pub gender: String,
}

impl Athlete {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        team: impl Into<String>,
        da_id: impl Into<String>,
        grade: u32,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            da_id: da_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            team: team.into(),
            grade,
            gender: gender.into(),
        }
    }

    /// Display name ("First Last")
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Read-only bib -> athlete resolution
#[derive(Debug, Clone, Default)]
pub struct CompetitorLookup {
    athletes: HashMap<Bib, Arc<Athlete>>,
}

impl CompetitorLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a lookup from a JSON object keyed by bib number
    ///
    /// ```json
    /// { "10": { "firstName": "Dana", "lastName": "Reyes", "team": "WPI" } }
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a lookup from JSON bytes
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: HashMap<i32, Athlete> = serde_json::from_slice(data)?;
        Ok(raw.into_iter().map(|(bib, athlete)| (Bib::new(bib), athlete)).collect())
    }

    /// Register an athlete under a bib, replacing any previous entry
    pub fn insert(&mut self, bib: Bib, athlete: Athlete) {
        self.athletes.insert(bib, Arc::new(athlete));
    }

    /// Resolve a bib. The sentinel bib never resolves.
    pub fn resolve(&self, bib: Bib) -> Option<Arc<Athlete>> {
        if !bib.is_known() {
            return None;
        }
        self.athletes.get(&bib).cloned()
    }

    pub fn contains(&self, bib: Bib) -> bool {
        bib.is_known() && self.athletes.contains_key(&bib)
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }
}

impl FromIterator<(Bib, Athlete)> for CompetitorLookup {
    fn from_iter<I: IntoIterator<Item = (Bib, Athlete)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (bib, athlete) in iter {
            lookup.insert(bib, athlete);
        }
        lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_known_and_unknown() {
        let mut lookup = CompetitorLookup::new();
        lookup.insert(Bib::new(10), Athlete::new("Dana", "Reyes", "WPI", "DAID", 12, "m"));

        assert_eq!(lookup.resolve(Bib::new(10)).unwrap().team, "WPI");
        assert!(lookup.resolve(Bib::new(11)).is_none());
        assert!(lookup.resolve(Bib::NO_BIB).is_none());
    }

    #[test]
    fn test_from_json_keyed_by_bib() {
        let json = br#"{
            "10": {"firstName": "Dana", "lastName": "Reyes", "team": "WPI", "grade": 12},
            "11": {"firstName": "Max", "lastName": "Rowe", "team": "MVHS"}
        }"#;
        let lookup = CompetitorLookup::from_json(json).unwrap();

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.resolve(Bib::new(10)).unwrap().name(), "Dana Reyes");
        assert_eq!(lookup.resolve(Bib::new(11)).unwrap().grade, 0);
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = CompetitorLookup::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CompetitorLookup::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
