//! Day-partitioned reading cache.
//!
//! A [`ReadingCache`] is built in one pass from the full result of a fetch
//! and is never patched afterwards: the next successful fetch builds a new
//! one and the coordinator swaps it in whole.
//!
//! # Invariants
//!
//! - Every reading that parsed appears in exactly one [`DayBucket`], the one
//!   whose [`DayKey`] is the reading's UTC date.
//! - Readings inside a bucket are ordered newest first.
//! - [`ReadingCache::day_index`] lists every key exactly once, newest first.

use std::collections::BTreeMap;

use tracing::debug;

use greenwatch_types::{DayKey, RawRecord, Reading};

/// All readings that fall on one UTC day, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    key: DayKey,
    readings: Vec<Reading>,
}

impl DayBucket {
    fn new(key: DayKey) -> Self {
        Self {
            key,
            readings: Vec::new(),
        }
    }

    /// The day this bucket covers.
    pub fn key(&self) -> DayKey {
        self.key
    }

    /// Readings for the day, newest first.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings for the day.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the bucket holds no readings. Built caches never contain
    /// empty buckets.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The newest reading of the day.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.first()
    }
}

/// In-memory index of every known reading, partitioned by UTC day.
#[derive(Debug, Clone, Default)]
pub struct ReadingCache {
    buckets: BTreeMap<DayKey, DayBucket>,
    day_index: Vec<DayKey>,
    total: usize,
    dropped: usize,
}

impl ReadingCache {
    /// Build a cache from raw source records.
    ///
    /// Records that fail to parse (missing or malformed timestamp, missing
    /// or non-numeric values) are dropped silently; the number dropped is
    /// available from [`dropped`](Self::dropped) and logged at `debug`.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let mut dropped = 0usize;
        let readings = records.into_iter().filter_map(|record| match record.parse() {
            Ok(reading) => Some(reading),
            Err(e) => {
                debug!("Dropping malformed record: {}", e);
                dropped += 1;
                None
            }
        });

        let mut cache = Self::from_readings(readings);
        cache.dropped = dropped;

        debug!(
            "Cache built with {} readings across {} days ({} dropped)",
            cache.total,
            cache.day_index.len(),
            dropped
        );
        cache
    }

    /// Build a cache from readings that are already validated.
    pub fn from_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = Reading>,
    {
        let mut buckets: BTreeMap<DayKey, DayBucket> = BTreeMap::new();
        let mut total = 0usize;

        for reading in readings {
            let key = reading.day_key();
            buckets
                .entry(key)
                .or_insert_with(|| DayBucket::new(key))
                .readings
                .push(reading);
            total += 1;
        }

        for bucket in buckets.values_mut() {
            bucket.readings.sort_by(Reading::newest_first);
        }

        let day_index = buckets.keys().rev().copied().collect();

        Self {
            buckets,
            day_index,
            total,
            dropped: 0,
        }
    }

    /// Days present in the cache, newest first.
    pub fn day_index(&self) -> &[DayKey] {
        &self.day_index
    }

    /// The bucket for `day`, if any reading fell on it.
    pub fn bucket(&self, day: DayKey) -> Option<&DayBucket> {
        self.buckets.get(&day)
    }

    /// Whether any reading fell on `day`.
    pub fn contains_day(&self, day: DayKey) -> bool {
        self.buckets.contains_key(&day)
    }

    /// Number of readings on `day` (0 when the day is absent).
    pub fn day_count(&self, day: DayKey) -> usize {
        self.buckets.get(&day).map_or(0, DayBucket::len)
    }

    /// Buckets ordered newest day first.
    pub fn buckets(&self) -> impl Iterator<Item = &DayBucket> {
        self.buckets.values().rev()
    }

    /// Total number of readings across all days.
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether the cache holds no readings.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of days with at least one reading.
    pub fn day_len(&self) -> usize {
        self.day_index.len()
    }

    /// Number of records dropped while building.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The newest reading overall.
    pub fn latest(&self) -> Option<&Reading> {
        self.buckets.values().next_back().and_then(DayBucket::latest)
    }

    /// Every reading, newest first.
    ///
    /// Buckets cover disjoint UTC days, so concatenating them newest day
    /// first is already in descending timestamp order.
    pub fn all_readings(&self) -> Vec<Reading> {
        let mut all = Vec::with_capacity(self.total);
        for bucket in self.buckets() {
            all.extend_from_slice(&bucket.readings);
        }
        debug_assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenwatch_types::RawValue;
    use time::macros::datetime;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn sample_records() -> Vec<RawRecord> {
        vec![
            RawRecord::new("2024-05-01T08:00:00Z", "21.0", "60"),
            RawRecord::new("2024-05-02T09:00:00Z", "23.0", "55"),
            RawRecord::new("2024-05-01T18:00:00Z", "25.5", "50"),
            RawRecord::new("2024-05-02T07:30:00Z", "20.0", "66"),
            RawRecord::new("2024-05-01T12:00:00Z", "24.0", "52"),
        ]
    }

    #[test]
    fn test_build_groups_by_day() {
        let cache = ReadingCache::build(&sample_records());

        assert_eq!(cache.len(), 5);
        assert_eq!(cache.day_len(), 2);
        assert_eq!(cache.day_count(day("2024-05-01")), 3);
        assert_eq!(cache.day_count(day("2024-05-02")), 2);
        assert_eq!(cache.day_count(day("2024-05-03")), 0);
        assert!(!cache.contains_day(day("2024-05-03")));
    }

    #[test]
    fn test_buckets_sorted_newest_first() {
        let cache = ReadingCache::build(&sample_records());
        let bucket = cache.bucket(day("2024-05-01")).unwrap();

        let times: Vec<_> = bucket.readings().iter().map(|r| r.timestamp).collect();
        assert_eq!(
            times,
            vec![
                datetime!(2024-05-01 18:00 UTC),
                datetime!(2024-05-01 12:00 UTC),
                datetime!(2024-05-01 08:00 UTC),
            ]
        );
        assert_eq!(bucket.latest().unwrap().temperature, 25.5);
    }

    #[test]
    fn test_day_index_newest_first() {
        let cache = ReadingCache::build(&sample_records());
        assert_eq!(cache.day_index(), &[day("2024-05-02"), day("2024-05-01")]);
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let mut records = sample_records();
        records.push(RawRecord {
            created_at: None,
            ..RawRecord::new("", "20", "50")
        });
        records.push(RawRecord::new("31/12/2024 10:00", "20", "50"));
        records.push(RawRecord::new("2024-05-01T10:00:00Z", "warm", "50"));
        records.push(RawRecord {
            created_at: Some(RawValue::Flag(false)),
            ..RawRecord::new("", "20", "50")
        });

        let cache = ReadingCache::build(&records);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.dropped(), 4);
    }

    #[test]
    fn test_odd_wire_rows_only_drop_themselves() {
        let json = r#"[
            {"created_at": "2024-05-01T08:00:00Z", "temperatura": "21", "umidade": "60"},
            {"created_at": "2024-05-01T09:00:00Z", "temperatura": {"v": 1}, "umidade": "60"},
            null,
            {"created_at": "2024-05-02T10:00:00Z", "temperatura": 23, "umidade": [55]},
            {"created_at": "2024-05-02T11:00:00Z", "temperatura": 24, "umidade": 54}
        ]"#;
        let records: Vec<RawRecord> = serde_json::from_str(json).unwrap();

        let cache = ReadingCache::build(&records);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.dropped(), 3);
        assert_eq!(cache.day_index(), &[day("2024-05-02"), day("2024-05-01")]);
    }

    #[test]
    fn test_offsets_normalized_to_utc_day() {
        let records = vec![
            RawRecord::new("2024-05-01T22:30:00-03:00", "20", "50"),
            RawRecord::new("2024-05-02T01:00:00Z", "21", "51"),
        ];
        let cache = ReadingCache::build(&records);
        assert_eq!(cache.day_index(), &[day("2024-05-02")]);
        assert_eq!(cache.day_count(day("2024-05-02")), 2);
    }

    #[test]
    fn test_empty_build() {
        let cache = ReadingCache::build(&Vec::<RawRecord>::new());
        assert!(cache.is_empty());
        assert!(cache.day_index().is_empty());
        assert!(cache.latest().is_none());
        assert!(cache.all_readings().is_empty());
    }

    #[test]
    fn test_all_readings_sorted_across_days() {
        let cache = ReadingCache::build(&sample_records());
        let all = cache.all_readings();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(all[0].timestamp, datetime!(2024-05-02 09:00 UTC));
        assert_eq!(cache.latest().unwrap().timestamp, all[0].timestamp);
    }

    #[test]
    fn test_buckets_iterate_newest_day_first() {
        let cache = ReadingCache::build(&sample_records());
        let keys: Vec<_> = cache.buckets().map(DayBucket::key).collect();
        assert_eq!(keys, cache.day_index());
    }
}
