//! Per-competitor race result
//!
//! A result is created the first time an accepted event mentions a bib and
//! is then corrected in place as better or later information arrives.
//! Every emission downstream is a snapshot of the result at that moment.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::athlete::Athlete;
use crate::ids::{Bib, SourceId};

/// Consolidated result for one bib
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub bib: Bib,
    pub athlete: Option<Arc<Athlete>>,
    /// 1-based place, `None` until placed
    pub place: Option<u32>,
    /// Finish minus current start, `None` until both are known
    #[serde(with = "elapsed_nanos", rename = "elapsedNanos")]
    pub elapsed_time: Option<TimeDelta>,
    /// Source that last set the finish
    pub finish_source: Option<SourceId>,
    /// Source that last set the place
    pub place_source: Option<SourceId>,
}

impl RaceResult {
    /// Empty result for a bib
    pub fn new(bib: Bib, athlete: Option<Arc<Athlete>>) -> Self {
        Self {
            bib,
            athlete,
            place: None,
            elapsed_time: None,
            finish_source: None,
            place_source: None,
        }
    }

    /// True once the result may be sent downstream
    ///
    /// Requires a known bib, a resolved athlete and a place. Elapsed time
    /// is optional: place-only results are published.
    pub fn is_publishable(&self) -> bool {
        self.bib.is_known()
            && self.athlete.is_some()
            && self.place.is_some()
            && self.place_source.is_some()
    }
}

/// `Option<TimeDelta>` as optional integer nanoseconds
mod elapsed_nanos {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<TimeDelta>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(delta) => {
                let nanos = delta
                    .num_nanoseconds()
                    .ok_or_else(|| serde::ser::Error::custom("elapsed time out of range"))?;
                Some(nanos).serialize(serializer)
            }
            None => None::<i64>.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TimeDelta>, D::Error> {
        Ok(Option::<i64>::deserialize(deserializer)?.map(TimeDelta::nanoseconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete() -> Arc<Athlete> {
        Arc::new(Athlete::new("Dana", "Reyes", "WPI", "DAID", 12, "m"))
    }

    #[test]
    fn test_new_result_not_publishable() {
        let result = RaceResult::new(Bib::new(10), Some(athlete()));
        assert!(!result.is_publishable());
    }

    #[test]
    fn test_place_only_result_publishable() {
        let mut result = RaceResult::new(Bib::new(10), Some(athlete()));
        result.place = Some(1);
        result.place_source = Some(SourceId::from("manual"));
        assert!(result.is_publishable());
    }

    #[test]
    fn test_time_only_result_not_publishable() {
        let mut result = RaceResult::new(Bib::new(10), Some(athlete()));
        result.elapsed_time = Some(TimeDelta::minutes(5));
        result.finish_source = Some(SourceId::from("chip"));
        assert!(!result.is_publishable());
    }

    #[test]
    fn test_missing_athlete_not_publishable() {
        let mut result = RaceResult::new(Bib::new(10), None);
        result.place = Some(1);
        result.place_source = Some(SourceId::from("manual"));
        assert!(!result.is_publishable());
    }

    #[test]
    fn test_elapsed_serialized_as_nanos() {
        let mut result = RaceResult::new(Bib::new(10), Some(athlete()));
        result.elapsed_time = Some(TimeDelta::milliseconds(1500));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["elapsedNanos"], 1_500_000_000i64);
        assert!(json["place"].is_null());

        let back: RaceResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
