//! The consumer-facing view over the cache.
//!
//! [`ReadingView`] owns the date filter and the current page, drives the
//! [`FetchCoordinator`], and answers every display question with a value
//! computed from the current cache. It is the only type most consumers need.
//!
//! # Example
//!
//! ```
//! use greenwatch_core::{MockSource, ReadingView, ViewOutcome};
//! use greenwatch_types::DayKey;
//!
//! #[tokio::main]
//! async fn main() {
//!     let day: DayKey = "2024-05-01".parse().unwrap();
//!     let source = MockSource::builder().day(day, 10).build();
//!     let view = ReadingView::new(source);
//!
//!     assert_eq!(view.refresh().await, ViewOutcome::Ok);
//!     let page = view.page_state();
//!     assert_eq!((page.current_page, page.total_pages), (1, 2));
//!
//!     view.next_page();
//!     assert_eq!(view.page_state().visible.len(), 4);
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use time::OffsetDateTime;
use tracing::{debug, info};

use greenwatch_types::{DayKey, Reading};

use crate::cache::ReadingCache;
use crate::config::Config;
use crate::coordinator::{FetchCoordinator, FetchStats, RefreshOutcome};
use crate::error::FetchError;
use crate::paginate::{DEFAULT_PAGE_SIZE, PageState, Paginator};
use crate::selection::{Filter, Selection, SelectionOutcome, select_active};
use crate::source::ReadingSource;
use crate::stats::{PageStats, TrendSeries};
use crate::thresholds::{TemperatureLevel, Thresholds};

/// Which state the view is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    /// Readings are available for the current filter.
    Ok,
    /// The selected day has no readings.
    EmptyForFilter,
    /// The last fetch succeeded but produced no usable readings.
    NoDataAtAll,
    /// Nothing has been fetched yet.
    PendingFetch,
    /// The last fetch failed. The dataset still reflects the last good
    /// cache; calling [`ReadingView::refresh`] again is the recovery path.
    Error(FetchError),
}

impl ViewOutcome {
    /// Whether readings are available.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Whether the last fetch failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The fetch failure, if any.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SelectionOutcome> for ViewOutcome {
    fn from(outcome: SelectionOutcome) -> Self {
        match outcome {
            SelectionOutcome::Ok => Self::Ok,
            SelectionOutcome::EmptyForFilter => Self::EmptyForFilter,
            SelectionOutcome::NoDataAtAll => Self::NoDataAtAll,
            SelectionOutcome::PendingFetch => Self::PendingFetch,
        }
    }
}

impl fmt::Display for ViewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::EmptyForFilter => write!(f, "no readings for the selected day"),
            Self::NoDataAtAll => write!(f, "no readings available"),
            Self::PendingFetch => write!(f, "waiting for first fetch"),
            Self::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Everything a consumer needs to render the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    /// The active filter.
    pub filter: Filter,
    /// Which state the view is in.
    pub outcome: ViewOutcome,
    /// Readings eligible for display, newest first.
    pub dataset: Vec<Reading>,
    /// The current page of `dataset`.
    pub page: PageState,
    /// Days with readings, newest first.
    pub day_index: Vec<DayKey>,
    /// When a fetch last succeeded.
    pub last_updated: Option<OffsetDateTime>,
    /// Whether a fetch is in flight.
    pub is_fetching: bool,
}

/// Behavior switches for a [`ReadingView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Readings per page. Zero is treated as 1.
    pub page_size: usize,
    /// Refresh once when a selected day is missing from the cache.
    pub refetch_on_miss: bool,
    /// Temperature thresholds.
    pub thresholds: Thresholds,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            refetch_on_miss: true,
            thresholds: Thresholds::default(),
        }
    }
}

impl From<&Config> for ViewOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.view.page_size,
            refetch_on_miss: config.view.refetch_on_miss,
            thresholds: Thresholds::new(config.thresholds),
        }
    }
}

struct ViewState {
    filter: Filter,
    paginator: Paginator,
    /// The cache the current page was computed against.
    seen: Arc<ReadingCache>,
}

/// Filtered, paginated access to readings from one source.
pub struct ReadingView<S> {
    coordinator: FetchCoordinator<S>,
    options: ViewOptions,
    state: Mutex<ViewState>,
}

impl<S> fmt::Debug for ReadingView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ReadingView")
            .field("filter", &state.filter)
            .field("page", &state.paginator.current_page())
            .field("options", &self.options)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

impl<S> ReadingView<S> {
    /// Create a view with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, ViewOptions::default())
    }

    /// Create a view with the given options.
    pub fn with_options(source: S, options: ViewOptions) -> Self {
        Self::from_coordinator(FetchCoordinator::new(source), options)
    }

    /// Create a view over an existing coordinator.
    pub fn from_coordinator(coordinator: FetchCoordinator<S>, options: ViewOptions) -> Self {
        let seen = coordinator.cache();
        Self {
            coordinator,
            options,
            state: Mutex::new(ViewState {
                filter: None,
                paginator: Paginator::new(options.page_size),
                seen,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The source readings are fetched from.
    pub fn source(&self) -> &Arc<S> {
        self.coordinator.source()
    }

    /// The options this view was built with.
    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// The thresholds used by [`page_level`](Self::page_level).
    pub fn thresholds(&self) -> &Thresholds {
        &self.options.thresholds
    }

    /// The active filter.
    pub fn filter(&self) -> Filter {
        self.lock().filter
    }

    /// Whether `day` is the current UTC date.
    pub fn is_today(&self, day: DayKey) -> bool {
        day == DayKey::today()
    }

    /// Recompute the selection for the current cache and filter.
    ///
    /// Resets the page when the cache was replaced since the last call, and
    /// clamps it to the dataset either way.
    fn select(&self, state: &mut ViewState) -> Selection {
        let cache = self.coordinator.cache();
        if !Arc::ptr_eq(&cache, &state.seen) {
            state.paginator.reset();
            state.seen = Arc::clone(&cache);
        }

        let selection = select_active(&cache, state.filter, self.coordinator.has_fetched());
        state.paginator.clamp_to(selection.dataset.len());
        selection
    }

    fn outcome_for(&self, selection: &Selection) -> ViewOutcome {
        match self.coordinator.last_error() {
            Some(error) => ViewOutcome::Error(error),
            None => selection.outcome.into(),
        }
    }

    /// The current state.
    pub fn outcome(&self) -> ViewOutcome {
        let mut state = self.lock();
        let selection = self.select(&mut state);
        self.outcome_for(&selection)
    }

    /// Readings eligible for display, newest first.
    pub fn active_dataset(&self) -> Vec<Reading> {
        let mut state = self.lock();
        self.select(&mut state).dataset
    }

    /// The current page.
    pub fn page_state(&self) -> PageState {
        let mut state = self.lock();
        let selection = self.select(&mut state);
        state.paginator.page(&selection.dataset)
    }

    /// Everything at once, computed from a single cache.
    pub fn snapshot(&self) -> ViewSnapshot {
        let mut state = self.lock();
        let selection = self.select(&mut state);
        let outcome = self.outcome_for(&selection);

        ViewSnapshot {
            filter: state.filter,
            outcome,
            page: state.paginator.page(&selection.dataset),
            day_index: state.seen.day_index().to_vec(),
            last_updated: self.coordinator.last_success_at(),
            is_fetching: self.coordinator.is_fetching(),
            dataset: selection.dataset,
        }
    }

    /// Jump to page `n`, clamped into range.
    pub fn go_to_page(&self, n: usize) -> PageState {
        self.navigate(|paginator, len| paginator.go_to(n, len))
    }

    /// Advance one page, stopping at the last.
    pub fn next_page(&self) -> PageState {
        self.navigate(Paginator::next)
    }

    /// Go back one page, stopping at the first.
    pub fn prev_page(&self) -> PageState {
        self.navigate(Paginator::prev)
    }

    fn navigate<F>(&self, step: F) -> PageState
    where
        F: FnOnce(&mut Paginator, usize) -> usize,
    {
        let mut state = self.lock();
        let selection = self.select(&mut state);
        let before = state.paginator.current_page();
        let after = step(&mut state.paginator, selection.dataset.len());
        if before != after {
            debug!("Page {} -> {}", before, after);
        }
        state.paginator.page(&selection.dataset)
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page_state().has_next()
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.page_state().has_prev()
    }

    /// Mean temperature and humidity over the *visible page*.
    ///
    /// `None` while the view is in an error state or the page is empty.
    pub fn page_stats(&self) -> Option<PageStats> {
        let snapshot = self.snapshot();
        if snapshot.outcome.is_error() {
            return None;
        }
        PageStats::from_readings(&snapshot.page.visible)
    }

    /// Temperature level of the visible page's mean.
    pub fn page_level(&self) -> Option<TemperatureLevel> {
        self.page_stats()
            .map(|stats| self.options.thresholds.evaluate_stats(&stats))
    }

    /// The visible page as an oldest-first chart series.
    ///
    /// `None` while the view is in an error state or the page is empty.
    pub fn trend(&self) -> Option<TrendSeries> {
        let snapshot = self.snapshot();
        if snapshot.outcome.is_error() {
            return None;
        }
        TrendSeries::from_readings(&snapshot.page.visible)
    }

    /// Days with readings, newest first.
    pub fn day_index(&self) -> Vec<DayKey> {
        self.coordinator.cache().day_index().to_vec()
    }

    /// Number of readings on `day`.
    pub fn day_count(&self, day: DayKey) -> usize {
        self.coordinator.cache().day_count(day)
    }

    /// When a fetch last succeeded.
    pub fn last_updated(&self) -> Option<OffsetDateTime> {
        self.coordinator.last_success_at()
    }

    /// Fetch counters.
    pub fn fetch_stats(&self) -> FetchStats {
        self.coordinator.stats()
    }

    /// Whether a fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.coordinator.is_fetching()
    }
}

impl<S: ReadingSource + 'static> ReadingView<S> {
    /// Fetch from the source and return the resulting state.
    ///
    /// Concurrent calls share one fetch. A successful fetch resets the page.
    pub async fn refresh(&self) -> ViewOutcome {
        match self.coordinator.refresh().await {
            RefreshOutcome::Updated { readings, days, .. } => {
                debug!("View refreshed: {} readings, {} days", readings, days);
            }
            RefreshOutcome::Failed { error, .. } => {
                debug!("View refresh failed: {}", error);
            }
            RefreshOutcome::Superseded { .. } => {}
        }
        self.outcome()
    }

    /// Change the filter.
    ///
    /// Setting the filter that is already active does nothing. Otherwise the
    /// page resets to 1. A fetch is triggered when nothing has been fetched
    /// yet, or, with `refetch_on_miss`, when the selected day is not cached
    /// (or the filter is cleared while the cache is empty); the selection is
    /// then re-evaluated against the new cache.
    pub async fn set_filter(&self, filter: Filter) -> ViewOutcome {
        let outcome = {
            let mut state = self.lock();
            if state.filter == filter {
                let selection = self.select(&mut state);
                return self.outcome_for(&selection);
            }

            match filter {
                Some(day) => info!("Filter set to {}", day),
                None => info!("Filter cleared"),
            }
            state.filter = filter;
            state.paginator.reset();
            self.select(&mut state).outcome
        };

        let refetch = match outcome {
            SelectionOutcome::PendingFetch => true,
            SelectionOutcome::EmptyForFilter | SelectionOutcome::NoDataAtAll => {
                self.options.refetch_on_miss
            }
            SelectionOutcome::Ok => false,
        };

        if refetch {
            match filter {
                Some(day) => debug!("Cache miss for {}, refreshing", day),
                None => debug!("No cached readings, refreshing"),
            }
            return self.refresh().await;
        }

        self.outcome()
    }

    /// Filter on the current UTC date.
    pub async fn select_today(&self) -> ViewOutcome {
        self.set_filter(Some(DayKey::today())).await
    }

    /// Remove the filter.
    pub async fn clear_filter(&self) -> ViewOutcome {
        self.set_filter(None).await
    }
}
