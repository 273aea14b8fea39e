//! The inbound data source abstraction.
//!
//! [`ReadingSource`] abstracts over the real REST endpoint
//! ([`HttpSource`](crate::HttpSource), behind the `http-source` feature) and
//! [`MockSource`](crate::MockSource) for tests.

use std::sync::Arc;

use async_trait::async_trait;

use greenwatch_types::RawRecord;

use crate::error::FetchError;

/// Something that can return every known reading in one call.
///
/// Implementations return records as delivered; parsing and validation
/// happen when the cache is built, so a source never needs to reject
/// individual malformed rows.
///
/// # Example
///
/// ```ignore
/// use greenwatch_core::{FetchError, ReadingSource};
///
/// async fn count<S: ReadingSource>(source: &S) -> Result<usize, FetchError> {
///     Ok(source.fetch_all().await?.len())
/// }
/// ```
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the complete set of records.
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FetchError>;

    /// A short label used in log output.
    fn describe(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("source")
            .to_string()
    }
}

#[async_trait]
impl<S: ReadingSource + ?Sized> ReadingSource for Arc<S> {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FetchError> {
        (**self).fetch_all().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
