//! Error types for greenwatch-core.
//!
//! # Where errors surface
//!
//! | Condition | Type | Surfaced as |
//! |-----------|------|-------------|
//! | One record with a bad timestamp or value | [`greenwatch_types::ParseError`] | Dropped by the cache builder, logged at `debug` |
//! | Network failure, bad status, undecodable body | [`FetchError::Transport`] | [`ViewOutcome::Error`](crate::ViewOutcome::Error), cache kept |
//! | Rejected credentials (401/403) | [`FetchError::Auth`] | [`ViewOutcome::Error`](crate::ViewOutcome::Error), cache kept |
//! | Unreadable or invalid configuration | [`ConfigError`](crate::ConfigError) | Returned from `Config::load*` |
//!
//! Fetch failures are values, not faults: the coordinator records them and
//! the view keeps serving the last good cache. Both fetch variants are
//! retryable; calling `refresh()` again is the recovery path.

use thiserror::Error;

/// Failure reported by a [`ReadingSource`](crate::ReadingSource).
///
/// `Clone` so that one in-flight fetch can hand the same result to every
/// caller that joined it.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The source could not be reached, answered with an unexpected status,
    /// or returned a body that could not be decoded.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The source rejected the configured credentials.
    #[error("Authentication rejected: {0}")]
    Auth(String),
}

impl FetchError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Whether retrying the same request can reasonably succeed.
    ///
    /// Transport failures are transient by nature. Auth failures are
    /// reported as retryable too, since a key can be rotated at runtime
    /// without restarting the consumer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Auth(_))
    }

    /// Whether this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Errors that can occur in greenwatch-core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The data source failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// A single record could not be parsed.
    #[error(transparent)]
    Parse(#[from] greenwatch_types::ParseError),

    /// The HTTP source could not be created.
    #[cfg(feature = "http-source")]
    #[error(transparent)]
    Http(#[from] crate::http::HttpSourceError),
}

/// Result type alias using greenwatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
