//! Mock reading source for testing.
//!
//! [`MockSource`] implements [`ReadingSource`] so the coordinator and view
//! can be exercised without a network.
//!
//! # Features
//!
//! - **Failure injection**: fail every fetch, or only the next few
//! - **Auth failures**: report rejected credentials instead of a transport error
//! - **Latency simulation**: delay each fetch to test coalescing
//! - **Synthetic data**: generate plausible readings with [`MockSourceBuilder::synthetic`]

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use greenwatch_types::{DayKey, RawRecord, RawValue};

use crate::error::FetchError;
use crate::source::ReadingSource;

/// A mock reading source for testing.
///
/// # Example
///
/// ```
/// use greenwatch_core::{MockSource, ReadingSource};
/// use greenwatch_types::RawRecord;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::with_records(vec![
///         RawRecord::new("2024-05-01T12:00:00Z", "22.5", "60"),
///     ]);
///
///     let records = source.fetch_all().await.unwrap();
///     assert_eq!(records.len(), 1);
///     assert_eq!(source.fetch_count(), 1);
/// }
/// ```
pub struct MockSource {
    records: RwLock<Vec<RawRecord>>,
    fetch_count: AtomicU32,
    should_fail: AtomicBool,
    fail_as_auth: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    /// Number of fetches to fail before succeeding.
    fail_count: AtomicU32,
    /// Current count of failures (decremented on each failure).
    remaining_failures: AtomicU32,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("latency_ms", &self.latency_ms.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a mock source that returns `records`.
    pub fn with_records(records: Vec<RawRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            fetch_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            fail_as_auth: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            latency_ms: AtomicU64::new(0),
            fail_count: AtomicU32::new(0),
            remaining_failures: AtomicU32::new(0),
        }
    }

    /// Start a builder.
    pub fn builder() -> MockSourceBuilder {
        MockSourceBuilder::new()
    }

    async fn check_should_fail(&self) -> Result<(), FetchError> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let transient = self
            .remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();

        if transient || self.should_fail.load(Ordering::Relaxed) {
            let message = self.fail_message.read().await.clone();
            if self.fail_as_auth.load(Ordering::Relaxed) {
                Err(FetchError::Auth(message))
            } else {
                Err(FetchError::Transport(message))
            }
        } else {
            Ok(())
        }
    }

    // --- Test control methods ---

    /// Replace the records returned by later fetches.
    pub async fn set_records(&self, records: Vec<RawRecord>) {
        *self.records.write().await = records;
    }

    /// Append records returned by later fetches.
    pub async fn add_records(&self, records: Vec<RawRecord>) {
        self.records.write().await.extend(records);
    }

    /// Number of records currently held.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Make every fetch fail (or succeed again).
    pub async fn set_failure(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Report failures as rejected credentials instead of transport errors.
    pub fn set_fail_as_auth(&self, auth: bool) {
        self.fail_as_auth.store(auth, Ordering::Relaxed);
    }

    /// Number of fetches performed, failed ones included.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Reset the fetch counter.
    pub fn reset_fetch_count(&self) {
        self.fetch_count.store(0, Ordering::Relaxed);
    }

    /// Set simulated fetch latency.
    ///
    /// Set to `Duration::ZERO` to disable latency simulation.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Fail the next `count` fetches, then succeed.
    ///
    /// ```
    /// use greenwatch_core::MockSource;
    ///
    /// let source = MockSource::new();
    /// source.set_transient_failures(2);
    /// assert_eq!(source.remaining_failures(), 2);
    /// ```
    pub fn set_transient_failures(&self, count: u32) {
        self.fail_count.store(count, Ordering::Relaxed);
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Re-arm the transient failures configured last.
    pub fn reset_transient_failures(&self) {
        self.remaining_failures
            .store(self.fail_count.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Number of transient failures left.
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ReadingSource for MockSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.check_should_fail().await?;
        Ok(self.records.read().await.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Builder for [`MockSource`].
#[derive(Debug, Clone, Default)]
pub struct MockSourceBuilder {
    records: Vec<RawRecord>,
    latency: Duration,
    transient_failures: u32,
    fail: bool,
}

impl MockSourceBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record.
    #[must_use]
    pub fn record(mut self, record: RawRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Add several records.
    #[must_use]
    pub fn records(mut self, records: impl IntoIterator<Item = RawRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Add `count` readings spread evenly over `day`, newest first, the
    /// oldest at 00:00 UTC. Every reading stays within that UTC day.
    #[must_use]
    pub fn day(mut self, day: DayKey, count: usize) -> Self {
        self.records.extend(readings_for_day(day, count));
        self
    }

    /// Add `per_day` synthetic readings for each of the `days` days ending
    /// today (UTC).
    #[must_use]
    pub fn synthetic(mut self, days: u32, per_day: usize) -> Self {
        let today = DayKey::today();
        for back in 0..days {
            let date = today.date() - time::Duration::days(i64::from(back));
            self.records
                .extend(readings_for_day(DayKey::from_date(date), per_day));
        }
        self
    }

    /// Set simulated fetch latency.
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail the first `count` fetches.
    #[must_use]
    pub fn transient_failures(mut self, count: u32) -> Self {
        self.transient_failures = count;
        self
    }

    /// Fail every fetch.
    #[must_use]
    pub fn failing(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }

    /// Build the mock source.
    #[must_use]
    pub fn build(self) -> MockSource {
        let source = MockSource::with_records(self.records);
        source.set_latency(self.latency);
        source.set_transient_failures(self.transient_failures);
        source.should_fail.store(self.fail, Ordering::Relaxed);
        source
    }
}

/// Plausible greenhouse readings: temperature drifts around 25 °C with a
/// daytime bump, humidity moves against it.
fn readings_for_day(day: DayKey, count: usize) -> Vec<RawRecord> {
    if count == 0 {
        return Vec::new();
    }

    let mut rng = rand::rng();
    let start = day.start();
    let last_second = 86_399u128;

    (0..count)
        .map(|i| {
            let offset = last_second * (count - 1 - i) as u128 / count as u128;
            let ts: OffsetDateTime = start + time::Duration::seconds(offset as i64);
            let hour = f64::from(ts.hour());
            let daytime = (-((hour - 14.0) / 5.0).powi(2)).exp();

            let temperature = 20.0 + 12.0 * daytime + rng.random_range(-1.5..1.5);
            let humidity = (80.0 - 30.0 * daytime + rng.random_range(-4.0..4.0)).clamp(0.0, 100.0);

            RawRecord {
                created_at: Some(RawValue::from(ts_to_text(ts))),
                temperature: Some(RawValue::from(format!("{temperature:.1}"))),
                humidity: Some(RawValue::from(format!("{humidity:.0}"))),
            }
        })
        .collect()
}

fn ts_to_text(ts: OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Unit tests for MockSource and MockSourceBuilder.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReadingCache;

    #[tokio::test]
    async fn test_mock_returns_records() {
        let source = MockSource::with_records(vec![
            RawRecord::new("2024-05-01T12:00:00Z", "22.5", "60"),
            RawRecord::new("2024-05-02T12:00:00Z", "23.5", "58"),
        ]);
        assert_eq!(source.fetch_all().await.unwrap().len(), 2);
        assert_eq!(source.fetch_count(), 1);

        source.add_records(vec![RawRecord::new("2024-05-03T12:00:00Z", "24", "50")]).await;
        assert_eq!(source.record_count().await, 3);

        source.set_records(Vec::new()).await;
        assert!(source.fetch_all().await.unwrap().is_empty());
        assert_eq!(source.fetch_count(), 2);

        source.reset_fetch_count();
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let source = MockSource::new();
        source.set_failure(true, Some("network down")).await;

        let err = source.fetch_all().await.unwrap_err();
        assert_eq!(err, FetchError::Transport("network down".into()));

        source.set_fail_as_auth(true);
        let err = source.fetch_all().await.unwrap_err();
        assert!(err.is_auth());

        source.set_failure(false, None).await;
        assert!(source.fetch_all().await.is_ok());
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_transient_failures() {
        let source = MockSource::new();
        source.set_transient_failures(2);

        assert!(source.fetch_all().await.is_err());
        assert_eq!(source.remaining_failures(), 1);
        assert!(source.fetch_all().await.is_err());
        assert!(source.fetch_all().await.is_ok());
        assert_eq!(source.remaining_failures(), 0);

        source.reset_transient_failures();
        assert_eq!(source.remaining_failures(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let source = MockSource::builder().latency(Duration::from_millis(500)).build();
        let started = tokio::time::Instant::now();
        source.fetch_all().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_builder_failing() {
        let source = MockSource::builder().transient_failures(1).build();
        assert!(source.fetch_all().await.is_err());
        assert!(source.fetch_all().await.is_ok());

        let source = MockSource::builder().failing(true).build();
        assert!(source.fetch_all().await.is_err());
    }

    #[test]
    fn test_builder_day_places_readings_on_that_day() {
        let day: DayKey = "2024-05-01".parse().unwrap();
        let source = MockSource::builder().day(day, 4).build();
        let records = source.records.try_read().unwrap().clone();

        let cache = ReadingCache::build(&records);
        assert_eq!(cache.dropped(), 0);
        assert_eq!(cache.day_index(), &[day]);
        assert_eq!(cache.day_count(day), 4);
    }

    #[test]
    fn test_day_spacing_stays_within_day() {
        let day: DayKey = "2024-05-01".parse().unwrap();
        let records = readings_for_day(day, 4);
        let cache = ReadingCache::build(&records);
        let readings = cache.bucket(day).unwrap().readings();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].timestamp, day.start() + time::Duration::seconds(64_799));
        assert_eq!(readings[3].timestamp, day.start());

        let dense = readings_for_day(day, 90_000);
        let cache = ReadingCache::build(&dense);
        assert_eq!(cache.day_index(), &[day]);
        assert_eq!(cache.day_count(day), 90_000);
    }

    #[test]
    fn test_synthetic_covers_recent_days() {
        let source = MockSource::builder().synthetic(3, 5).build();
        let records = source.records.try_read().unwrap().clone();
        assert_eq!(records.len(), 15);

        let cache = ReadingCache::build(&records);
        assert_eq!(cache.day_len(), 3);
        assert_eq!(cache.day_index()[0], DayKey::today());
        for r in cache.all_readings() {
            assert!((0.0..=100.0).contains(&r.humidity));
            assert!(r.temperature > 10.0 && r.temperature < 40.0);
        }
    }

    #[test]
    fn test_zero_per_day_is_empty() {
        let source = MockSource::builder().synthetic(2, 0).build();
        assert_eq!(source.records.try_read().unwrap().len(), 0);
    }
}
