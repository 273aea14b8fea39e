//! Client-side read engine for greenhouse sensor readings.
//!
//! This crate fetches the complete set of temperature/humidity readings from
//! a remote source, partitions them by UTC day, and serves filtered,
//! paginated views without refetching more than necessary.
//!
//! # Features
//!
//! - **Day partitioning**: readings grouped into newest-first buckets per UTC date
//! - **Date filter**: show one day or every day, with cache-miss refetching
//! - **Pagination**: fixed-size pages with clamped navigation
//! - **Coalesced fetches**: concurrent refreshes share a single request
//! - **Last-good cache**: failed fetches never wipe what is already shown
//! - **Page statistics**: means, trend series and temperature thresholds
//! - **HTTP source**: PostgREST/Supabase adapter behind the `http-source` feature
//!
//! # Data Flow
//!
//! | Step | Component | Output |
//! |------|-----------|--------|
//! | 1 | [`ReadingSource`] | raw records |
//! | 2 | [`FetchCoordinator`] | a rebuilt [`ReadingCache`] |
//! | 3 | [`select_active`] | the active dataset for the filter |
//! | 4 | [`paginate`] | the visible [`PageState`] |
//!
//! [`ReadingView`] runs the whole pipeline.
//!
//! # Quick Start
//!
//! ```
//! use greenwatch_core::{MockSource, ReadingView, ViewOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let view = ReadingView::new(MockSource::builder().synthetic(3, 8).build());
//!
//!     assert_eq!(view.refresh().await, ViewOutcome::Ok);
//!     println!("{} days cached", view.day_index().len());
//!
//!     view.select_today().await;
//!     if let Some(stats) = view.page_stats() {
//!         println!("Mean temperature: {:.1} °C", stats.mean_temperature);
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
#[cfg(feature = "http-source")]
pub mod http;
pub mod mock;
pub mod paginate;
pub mod selection;
pub mod source;
pub mod stats;
pub mod thresholds;
pub mod view;

// Re-export the types crate for convenience
pub use greenwatch_types::types;

// Core exports
pub use cache::{DayBucket, ReadingCache};
pub use coordinator::{FetchCoordinator, FetchPhase, FetchStats, RefreshOutcome};
pub use error::{Error, FetchError, Result};
pub use paginate::{DEFAULT_PAGE_SIZE, PageState, Paginator, paginate};
pub use selection::{Filter, Selection, SelectionOutcome, select_active};
pub use source::ReadingSource;
pub use view::{ReadingView, ViewOptions, ViewOutcome, ViewSnapshot};

pub use config::{Config, ConfigError, SourceConfig, ValidationError, ViewConfig};
#[cfg(feature = "http-source")]
pub use http::{HttpSource, HttpSourceError};
pub use mock::{MockSource, MockSourceBuilder};
pub use stats::{PageStats, TrendSeries};
pub use thresholds::{TemperatureLevel, ThresholdConfig, Thresholds};

// Re-export from greenwatch-types
pub use greenwatch_types::{DayKey, ParseError, RawRecord, RawValue, Reading};
