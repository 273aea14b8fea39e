//! Fetch coordination and cache ownership.
//!
//! The [`FetchCoordinator`] is the only writer of the [`ReadingCache`]. It
//! guarantees that at most one fetch is in flight: a [`refresh`] issued
//! while another is pending joins it instead of calling the source again.
//!
//! ```text
//! refresh() A ─┐
//!              │                       ReadingSource
//! refresh() B ─┼──► FetchCoordinator ──► fetch_all()
//!              │          │                   │
//! refresh() C ─┘          │                   │
//!                         ▼                   ▼
//!                  [A, B, C await the   [one request]
//!                   same result; it is        │
//!                   applied once]◄────────────┘
//! ```
//!
//! Every fetch carries a generation number. A result is applied only if its
//! generation is newer than the last applied one, so a late caller can never
//! roll the cache back.
//!
//! [`refresh`]: FetchCoordinator::refresh

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use greenwatch_types::RawRecord;

use crate::cache::ReadingCache;
use crate::error::FetchError;
use crate::source::ReadingSource;

type FetchResult = Result<Arc<Vec<RawRecord>>, FetchError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Whether a fetch is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchPhase {
    /// No fetch in flight.
    Idle,
    /// A fetch is in flight; further refreshes join it.
    Fetching,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
        }
    }
}

/// Fetch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStats {
    /// Fetches actually issued to the source.
    pub started: u64,
    /// Fetches whose success was applied to the cache.
    pub successes: u64,
    /// Fetches whose failure was recorded.
    pub failures: u64,
    /// Refresh calls that joined a fetch already in flight.
    pub joined: u64,
}

impl FetchStats {
    /// Success rate as a percentage of completed fetches.
    pub fn success_rate(&self) -> f64 {
        let completed = self.successes + self.failures;
        if completed == 0 {
            0.0
        } else {
            (self.successes as f64 / completed as f64) * 100.0
        }
    }

    /// Share of refresh calls that were coalesced, from 0.0 to 1.0.
    pub fn coalescing_ratio(&self) -> f64 {
        let total = self.started + self.joined;
        if total == 0 {
            0.0
        } else {
            self.joined as f64 / total as f64
        }
    }
}

/// What a [`FetchCoordinator::refresh`] call resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The fetch succeeded and the cache now reflects it.
    Updated {
        /// Generation of the applied fetch.
        generation: u64,
        /// Readings in the rebuilt cache.
        readings: usize,
        /// Days in the rebuilt cache.
        days: usize,
        /// Records dropped as malformed.
        dropped: usize,
    },
    /// The fetch failed; the previous cache is still in place.
    Failed {
        /// Generation of the failed fetch.
        generation: u64,
        /// Why it failed.
        error: FetchError,
    },
    /// A newer fetch was applied first; this result was discarded.
    Superseded {
        /// Generation of the discarded fetch.
        generation: u64,
    },
}

impl RefreshOutcome {
    /// Whether the cache reflects this call's fetch.
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    /// The failure, if the fetch failed.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Generation of the fetch this call awaited.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Updated { generation, .. }
            | Self::Failed { generation, .. }
            | Self::Superseded { generation } => *generation,
        }
    }
}

struct Inner {
    cache: Arc<ReadingCache>,
    in_flight: Option<(u64, SharedFetch)>,
    next_generation: u64,
    applied_generation: u64,
    completed: bool,
    last_error: Option<FetchError>,
    last_success_at: Option<OffsetDateTime>,
    stats: FetchStats,
}

/// Owns the reading cache and serializes fetches against a source.
pub struct FetchCoordinator<S> {
    source: Arc<S>,
    inner: Mutex<Inner>,
}

impl<S> fmt::Debug for FetchCoordinator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("FetchCoordinator")
            .field("phase", &phase_of(&inner))
            .field("applied_generation", &inner.applied_generation)
            .field("readings", &inner.cache.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

fn phase_of(inner: &Inner) -> FetchPhase {
    if inner.in_flight.is_some() {
        FetchPhase::Fetching
    } else {
        FetchPhase::Idle
    }
}

impl<S> FetchCoordinator<S> {
    /// Create a coordinator with an empty cache.
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    /// Create a coordinator around a shared source.
    pub fn from_arc(source: Arc<S>) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                cache: Arc::new(ReadingCache::default()),
                in_flight: None,
                next_generation: 1,
                applied_generation: 0,
                completed: false,
                last_error: None,
                last_success_at: None,
                stats: FetchStats::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The source fetches go to.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The current cache. Cheap to call; the cache itself is never mutated,
    /// only replaced.
    pub fn cache(&self) -> Arc<ReadingCache> {
        Arc::clone(&self.lock().cache)
    }

    /// Current phase.
    pub fn phase(&self) -> FetchPhase {
        phase_of(&self.lock())
    }

    /// Whether a fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.phase() == FetchPhase::Fetching
    }

    /// Whether at least one fetch has completed, successfully or not.
    pub fn has_fetched(&self) -> bool {
        self.lock().completed
    }

    /// The failure of the most recent fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<FetchError> {
        self.lock().last_error.clone()
    }

    /// When a fetch last succeeded.
    pub fn last_success_at(&self) -> Option<OffsetDateTime> {
        self.lock().last_success_at
    }

    /// Generation of the last applied fetch (0 before any).
    pub fn generation(&self) -> u64 {
        self.lock().applied_generation
    }

    /// Fetch counters.
    pub fn stats(&self) -> FetchStats {
        self.lock().stats
    }
}

impl<S: ReadingSource + 'static> FetchCoordinator<S> {
    /// Fetch from the source and rebuild the cache.
    ///
    /// If a fetch is already in flight this call joins it and no new request
    /// is made. The result is applied exactly once no matter how many callers
    /// await it; every caller gets the same outcome.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (generation, fetch) = self.begin();
        let result = fetch.await;
        self.finish(generation, result)
    }

    fn begin(&self) -> (u64, SharedFetch) {
        let mut inner = self.lock();

        if let Some((generation, fetch)) = &inner.in_flight {
            let joined = (*generation, fetch.clone());
            inner.stats.joined += 1;
            debug!("Joining in-flight fetch #{}", joined.0);
            return joined;
        }

        let generation = inner.next_generation;
        inner.next_generation += 1;
        inner.stats.started += 1;

        let source = Arc::clone(&self.source);
        info!("Fetch #{} started from {}", generation, source.describe());
        let fetch = async move { source.fetch_all().await.map(Arc::new) }
            .boxed()
            .shared();

        inner.in_flight = Some((generation, fetch.clone()));
        (generation, fetch)
    }

    fn finish(&self, generation: u64, result: FetchResult) -> RefreshOutcome {
        let mut inner = self.lock();

        if matches!(&inner.in_flight, Some((g, _)) if *g == generation) {
            inner.in_flight = None;
        }

        if generation < inner.applied_generation {
            debug!(
                "Discarding stale fetch #{} (applied #{})",
                generation, inner.applied_generation
            );
            return RefreshOutcome::Superseded { generation };
        }

        let first = generation > inner.applied_generation;
        if first {
            inner.applied_generation = generation;
            inner.completed = true;
        }

        match result {
            Ok(records) => {
                if first {
                    inner.cache = Arc::new(ReadingCache::build(records.iter()));
                    inner.last_error = None;
                    inner.last_success_at = Some(OffsetDateTime::now_utc());
                    inner.stats.successes += 1;
                    info!(
                        "Fetch #{} applied: {} readings across {} days",
                        generation,
                        inner.cache.len(),
                        inner.cache.day_len()
                    );
                }
                RefreshOutcome::Updated {
                    generation,
                    readings: inner.cache.len(),
                    days: inner.cache.day_len(),
                    dropped: inner.cache.dropped(),
                }
            }
            Err(error) => {
                if first {
                    warn!("Fetch #{} failed, keeping previous cache: {}", generation, error);
                    inner.last_error = Some(error.clone());
                    inner.stats.failures += 1;
                }
                RefreshOutcome::Failed { generation, error }
            }
        }
    }
}
