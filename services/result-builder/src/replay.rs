//! Replay verification
//!
//! Aggregation is a pure fold over the event sequence: replaying the same
//! events into a fresh aggregator must produce the same emissions. The
//! digest covers every emitted snapshot in order.

use sha2::{Digest, Sha256};
use tracing::{error, info};

use event_stream::MemoryResultSink;
use race_types::{CompetitorLookup, RaceEvent, RaceResult, SourceRanks};

use crate::aggregator::{AggregatorError, ResultAggregator};

/// Fold `events` into a fresh aggregator and return everything it emitted
pub fn replay_events(
    events: &[RaceEvent],
    ranks: &SourceRanks,
    athletes: &CompetitorLookup,
) -> Result<Vec<RaceResult>, AggregatorError> {
    let mut aggregator = ResultAggregator::new(ranks.clone(), athletes.clone());
    let mut sink = MemoryResultSink::new();
    for event in events {
        aggregator.apply(event, &mut sink)?;
    }
    Ok(sink.into_results())
}

/// SHA-256 (hex) over an emitted result sequence
pub fn results_digest(results: &[RaceResult]) -> String {
    let mut hasher = Sha256::new();

    for result in results {
        hasher.update(result.bib.number().to_le_bytes());
        hasher.update(b"|");
        if let Some(athlete) = &result.athlete {
            hasher.update(athlete.da_id.as_bytes());
            hasher.update(athlete.name().as_bytes());
        }
        hasher.update(b"|");
        hasher.update(result.place.unwrap_or(0).to_le_bytes());
        hasher.update(b"|");
        if let Some(elapsed) = result.elapsed_time {
            hasher.update(elapsed.num_seconds().to_le_bytes());
            hasher.update(elapsed.subsec_nanos().to_le_bytes());
        }
        hasher.update(b"|");
        if let Some(source) = &result.finish_source {
            hasher.update(source.as_str().as_bytes());
        }
        hasher.update(b"|");
        if let Some(source) = &result.place_source {
            hasher.update(source.as_str().as_bytes());
        }
        hasher.update(b"===");
    }

    hex::encode(hasher.finalize())
}

/// Outcome of comparing two replays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub digest_a: String,
    pub digest_b: String,
    pub emitted_a: usize,
    pub emitted_b: usize,
}

impl ReplayReport {
    pub fn is_match(&self) -> bool {
        self.digest_a == self.digest_b && self.emitted_a == self.emitted_b
    }
}

pub struct ReplayVerifier;

impl ReplayVerifier {
    /// Replay the same events twice from empty state and compare
    pub fn verify_double_replay(
        events: &[RaceEvent],
        ranks: &SourceRanks,
        athletes: &CompetitorLookup,
    ) -> Result<ReplayReport, AggregatorError> {
        let run_a = replay_events(events, ranks, athletes)?;
        let run_b = replay_events(events, ranks, athletes)?;

        let report = ReplayReport {
            digest_a: results_digest(&run_a),
            digest_b: results_digest(&run_b),
            emitted_a: run_a.len(),
            emitted_b: run_b.len(),
        };

        if report.is_match() {
            info!(events = events.len(), emitted = report.emitted_a, digest = %report.digest_a, "Replay verified");
        } else {
            error!(
                digest_a = %report.digest_a,
                digest_b = %report.digest_b,
                emitted_a = report.emitted_a,
                emitted_b = report.emitted_b,
                "Replay diverged"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use race_types::{Athlete, Bib, EventId, FinishEvent, PlaceEvent, StartEvent};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 5, 9, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    fn athletes() -> CompetitorLookup {
        [10, 11]
            .into_iter()
            .map(|b| (Bib::new(b), Athlete::new("A", b.to_string(), "T", "", 9, "m")))
            .collect()
    }

    fn events() -> Vec<RaceEvent> {
        vec![
            RaceEvent::new(EventId::new(1), t(0), FinishEvent::new("chip", 10, t(300))),
            RaceEvent::new(EventId::new(2), t(0), PlaceEvent::new("manual", 10, 1)),
            RaceEvent::new(EventId::new(3), t(0), PlaceEvent::new("manual", 11, 1)),
            RaceEvent::new(EventId::new(4), t(0), StartEvent::new("gun", t(0))),
        ]
    }

    #[test]
    fn test_double_replay_matches() {
        let ranks = SourceRanks::new().with("chip", 1).with("manual", 2);
        let report = ReplayVerifier::verify_double_replay(&events(), &ranks, &athletes()).unwrap();
        assert!(report.is_match());
        assert_eq!(report.emitted_a, 3);
        assert_eq!(report.digest_a.len(), 64);
    }

    #[test]
    fn test_digest_sensitive_to_order() {
        let results = replay_events(&events(), &SourceRanks::new(), &athletes()).unwrap();
        let mut reversed = results.clone();
        reversed.reverse();
        assert_ne!(results_digest(&results), results_digest(&reversed));
    }

    #[test]
    fn test_digest_of_no_results_is_empty_sha256() {
        assert_eq!(
            results_digest(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
