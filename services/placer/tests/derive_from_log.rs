//! Place derivation driven through an event log

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use event_stream::{EventReader, EventWriter, MemoryLog, StreamError};
use placer::{PlaceDeriver, PlacerError};
use proptest::prelude::*;
use race_types::{EventData, FinishEvent, RaceEvent, SourceRanks, StartEvent};
use std::collections::HashMap;
use std::time::Duration;

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 5, 9, 0, 0).unwrap() + TimeDelta::seconds(secs)
}

fn ranks() -> SourceRanks {
    SourceRanks::new().with("chip", 1).with("manual", 2).with("placer", 3)
}

fn drain(log: &MemoryLog) -> Vec<RaceEvent> {
    let mut cursor = log.cursor();
    let mut events = Vec::new();
    while let Some(e) = cursor.read_next(Duration::from_millis(1)).unwrap() {
        events.push(e);
    }
    events
}

#[test]
fn test_run_writes_places_and_skips_other_events() {
    let input = MemoryLog::new();
    input.append_event(t(0), StartEvent::new("gun", t(0)).into()).unwrap();
    input.append_event(t(310), FinishEvent::new("chip", 11, t(310)).into()).unwrap();
    input.append_event(t(311), FinishEvent::new("manual", -1, t(311)).into()).unwrap();
    input.append_event(t(312), FinishEvent::new("chip", 10, t(300)).into()).unwrap();
    input.close();

    let mut output = MemoryLog::new();
    let mut deriver = PlaceDeriver::new(ranks(), "placer");
    let stats = deriver.run(&mut input.cursor(), &mut output, Duration::ZERO).unwrap();

    assert_eq!(stats.events_read, 4);
    assert_eq!(stats.finishes_accepted, 2);
    assert_eq!(stats.finishes_ignored, 1);
    assert_eq!(stats.places_emitted, 3);

    let places: Vec<(i32, u32, DateTime<Utc>)> = drain(&output)
        .into_iter()
        .filter_map(|e| match e.data {
            EventData::Place(p) => Some((p.bib.number(), p.place, e.event_time)),
            _ => None,
        })
        .collect();
    assert_eq!(places, vec![(11, 1, t(310)), (10, 1, t(312)), (11, 2, t(312))]);
}

#[test]
fn test_write_failure_is_fatal() {
    let input = MemoryLog::new();
    input.append_event(t(1), FinishEvent::new("chip", 10, t(300)).into()).unwrap();
    input.close();

    let output = MemoryLog::new();
    output.close();
    let mut output_writer = output.clone();

    let mut deriver = PlaceDeriver::new(ranks(), "placer");
    let err = deriver
        .run(&mut input.cursor(), &mut output_writer, Duration::ZERO)
        .unwrap_err();
    assert!(matches!(err, PlacerError::Write(StreamError::Closed)));
}

#[test]
fn test_decode_failure_is_fatal() {
    let input = MemoryLog::new();
    input.append_raw(b"{broken".to_vec()).unwrap();
    input.close();

    let mut deriver = PlaceDeriver::new(ranks(), "placer");
    let err = deriver
        .run(&mut input.cursor(), &mut MemoryLog::new(), Duration::ZERO)
        .unwrap_err();
    assert!(matches!(err, PlacerError::Read(StreamError::Decode { .. })));
}

#[test]
fn test_writer_trait_object() {
    let input = MemoryLog::new();
    input.append_event(t(1), FinishEvent::new("chip", 10, t(300)).into()).unwrap();
    input.close();

    let mut output = MemoryLog::new();
    let writer: &mut dyn EventWriter = &mut output;
    let mut deriver = PlaceDeriver::new(ranks(), "placer");
    deriver.run(&mut input.cursor(), writer, Duration::ZERO).unwrap();
    assert_eq!(output.len(), 1);
}

proptest! {
    /// Whatever the arrival order, the last place seen per bib is its rank by finish time
    #[test]
    fn prop_converges_to_time_order(offsets in proptest::collection::hash_set(0i64..10_000, 1..25)) {
        let offsets: Vec<i64> = offsets.into_iter().collect();
        let mut deriver = PlaceDeriver::new(ranks(), "placer");
        let mut latest: HashMap<i32, u32> = HashMap::new();

        for (i, offset) in offsets.iter().enumerate() {
            let bib = i as i32 + 1;
            for place in deriver.apply_finish(&FinishEvent::new("chip", bib, t(*offset))) {
                latest.insert(place.bib.number(), place.place);
            }
        }

        let mut by_time: Vec<(i64, i32)> = offsets.iter().enumerate().map(|(i, o)| (*o, i as i32 + 1)).collect();
        by_time.sort();
        for (expected, (_, bib)) in by_time.iter().enumerate() {
            prop_assert_eq!(latest[bib], expected as u32 + 1);
        }
    }
}
