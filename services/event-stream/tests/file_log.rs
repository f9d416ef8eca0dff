//! File-backed log behavior

use chrono::{DateTime, TimeZone, Utc};
use event_stream::{read_all_pages, EventReader, EventWriter, JsonLinesLog, JsonLinesWriter, StreamError};
use proptest::prelude::*;
use race_types::{EventData, FinishEvent, PlaceEvent};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn t(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 5, 9, 0, 0).unwrap() + chrono::TimeDelta::seconds(secs as i64)
}

#[test]
fn test_file_written_then_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("race.jsonl");

    let mut writer = JsonLinesWriter::create(&path).unwrap();
    for bib in 1..=4i32 {
        writer.append(t(bib as u32), FinishEvent::new("mat-a", bib, t(bib as u32)).into()).unwrap();
    }
    drop(writer);

    let log = JsonLinesLog::load(&path).unwrap();
    assert_eq!(log.len(), 4);
    let events = read_all_pages(&log.cursor(), 3).unwrap();
    assert_eq!(events.len(), 4);
    assert!(events.windows(2).all(|w| w[0].id < w[1].id));
}

#[test]
fn test_corrupt_line_stops_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("race.jsonl");

    let mut writer = JsonLinesWriter::create(&path).unwrap();
    writer.append(t(1), PlaceEvent::new("manual", 10, 1).into()).unwrap();
    drop(writer);
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("{\"truncated\n");
    fs::write(&path, text).unwrap();

    let log = JsonLinesLog::load(&path).unwrap();
    let mut cursor = log.cursor();
    assert!(cursor.read_next(Duration::ZERO).unwrap().is_some());
    assert!(matches!(cursor.read_next(Duration::ZERO), Err(StreamError::Decode { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(JsonLinesLog::load("/no/such/race.jsonl"), Err(StreamError::Io(_))));
}

proptest! {
    #[test]
    fn prop_paging_matches_sequential_reads(count in 0usize..40, page in 1usize..8) {
        let log = event_stream::MemoryLog::new();
        for i in 0..count {
            let data: EventData = FinishEvent::new("mat-a", i as i32 + 1, t(i as u32)).into();
            log.append_event(t(i as u32), data).unwrap();
        }
        log.close();

        let paged = read_all_pages(&log.cursor(), page).unwrap();
        let mut cursor = log.cursor();
        let mut sequential = Vec::new();
        while let Some(event) = cursor.read_next(Duration::ZERO).unwrap() {
            sequential.push(event);
        }
        prop_assert_eq!(paged, sequential);
    }
}
