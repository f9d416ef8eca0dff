//! Best finish per bib

use std::collections::HashMap;

use race_types::{Bib, FinishEvent, SourceRanks};

/// Best-ranked finish per bib plus the order bibs were first seen
#[derive(Debug, Clone, Default)]
pub struct FinishCache {
    finishes: HashMap<Bib, FinishEvent>,
    arrival: Vec<Bib>,
}

impl FinishCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `finish` if it beats the cached one for its bib.
    ///
    /// Returns false when the candidate loses the rank comparison.
    pub fn offer(&mut self, finish: &FinishEvent, ranks: &SourceRanks) -> bool {
        let cached = self.finishes.get(&finish.bib).map(|f| &f.source);
        if !ranks.is_better_finish(&finish.source, cached) {
            return false;
        }
        if self.finishes.insert(finish.bib, finish.clone()).is_none() {
            self.arrival.push(finish.bib);
        }
        true
    }

    pub fn get(&self, bib: Bib) -> Option<&FinishEvent> {
        self.finishes.get(&bib)
    }

    /// All cached bibs by ascending finish time; ties keep arrival order
    pub fn ordering(&self) -> Vec<Bib> {
        let mut order = self.arrival.clone();
        order.sort_by_key(|bib| self.finishes.get(bib).map(|f| f.finish_time));
        order
    }

    pub fn len(&self) -> usize {
        self.arrival.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrival.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 5, 9, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    fn ranks() -> SourceRanks {
        SourceRanks::new().with("chip", 1).with("manual", 2)
    }

    #[test]
    fn test_worse_rank_never_replaces() {
        let mut cache = FinishCache::new();
        assert!(cache.offer(&FinishEvent::new("chip", 10, t(300)), &ranks()));
        assert!(!cache.offer(&FinishEvent::new("manual", 10, t(301)), &ranks()));
        assert_eq!(cache.get(Bib::new(10)).unwrap().finish_time, t(300));
    }

    #[test]
    fn test_equal_rank_ignored_once_cached() {
        let mut cache = FinishCache::new();
        assert!(cache.offer(&FinishEvent::new("manual", 10, t(300)), &ranks()));
        assert!(!cache.offer(&FinishEvent::new("manual", 10, t(200)), &ranks()));
        assert_eq!(cache.get(Bib::new(10)).unwrap().finish_time, t(300));
    }

    #[test]
    fn test_better_rank_replaces_without_reordering_arrival() {
        let mut cache = FinishCache::new();
        cache.offer(&FinishEvent::new("manual", 10, t(300)), &ranks());
        cache.offer(&FinishEvent::new("manual", 11, t(310)), &ranks());
        assert!(cache.offer(&FinishEvent::new("chip", 10, t(320)), &ranks()));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.ordering(), vec![Bib::new(11), Bib::new(10)]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut cache = FinishCache::new();
        cache.offer(&FinishEvent::new("chip", 12, t(300)), &ranks());
        cache.offer(&FinishEvent::new("chip", 10, t(300)), &ranks());
        cache.offer(&FinishEvent::new("chip", 11, t(299)), &ranks());

        assert_eq!(cache.ordering(), vec![Bib::new(11), Bib::new(12), Bib::new(10)]);
    }
}
