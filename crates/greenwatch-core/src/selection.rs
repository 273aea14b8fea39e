//! Resolving the active dataset from the cache and the current filter.
//!
//! Selection is synchronous and pure: it reads a [`ReadingCache`] and a
//! [`Filter`] and returns the readings eligible for display together with a
//! [`SelectionOutcome`] that tells the consumer which empty state (if any)
//! applies. Deciding whether a miss should trigger a fetch is left to the
//! caller; see [`SelectionOutcome::PendingFetch`].

use std::fmt;

use greenwatch_types::{DayKey, Reading};

use crate::cache::ReadingCache;

/// The consumer's date filter. `None` shows every day.
pub type Filter = Option<DayKey>;

/// How a selection resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionOutcome {
    /// The dataset is non-empty.
    Ok,
    /// A day was selected that has no readings in a fetched cache.
    EmptyForFilter,
    /// No filter, and the last fetch produced no usable readings.
    NoDataAtAll,
    /// Nothing has been fetched yet, so emptiness means nothing.
    PendingFetch,
}

impl SelectionOutcome {
    /// Whether the selection produced readings.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Whether resolving this outcome needs a fetch first.
    pub fn needs_fetch(self) -> bool {
        self == Self::PendingFetch
    }
}

impl fmt::Display for SelectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::EmptyForFilter => "no readings for the selected day",
            Self::NoDataAtAll => "no readings available",
            Self::PendingFetch => "waiting for first fetch",
        };
        f.write_str(s)
    }
}

/// The result of [`select_active`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Readings eligible for display, newest first.
    pub dataset: Vec<Reading>,
    /// Which state the selection landed in.
    pub outcome: SelectionOutcome,
}

impl Selection {
    fn empty(outcome: SelectionOutcome) -> Self {
        Self {
            dataset: Vec::new(),
            outcome,
        }
    }
}

/// Compute the active dataset for `filter`.
///
/// `fetched` reports whether at least one fetch has completed (successfully
/// or not); before that, an empty result is [`SelectionOutcome::PendingFetch`]
/// rather than a definitive empty state.
pub fn select_active(cache: &ReadingCache, filter: Filter, fetched: bool) -> Selection {
    match filter {
        None => {
            let dataset = cache.all_readings();
            let outcome = if !dataset.is_empty() {
                SelectionOutcome::Ok
            } else if fetched {
                SelectionOutcome::NoDataAtAll
            } else {
                SelectionOutcome::PendingFetch
            };
            Selection { dataset, outcome }
        }
        Some(day) => match cache.bucket(day) {
            Some(bucket) if !bucket.is_empty() => Selection {
                dataset: bucket.readings().to_vec(),
                outcome: SelectionOutcome::Ok,
            },
            _ if fetched => Selection::empty(SelectionOutcome::EmptyForFilter),
            _ => Selection::empty(SelectionOutcome::PendingFetch),
        },
    }
}
