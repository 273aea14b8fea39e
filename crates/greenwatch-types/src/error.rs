//! Error types for record parsing in greenwatch-types.

use thiserror::Error;

/// Errors that can occur when turning a raw record into a [`Reading`](crate::Reading).
///
/// These never leave the cache builder in normal operation: a record that
/// fails to parse is dropped. The variants exist so that the builder can log
/// why, and so that callers parsing single records get a useful message.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A required field was absent or null.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The timestamp could not be parsed into an instant.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A numeric field held something that is not a finite number.
    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// The offending value, rendered as text.
        value: String,
    },

    /// A day key was not in `YYYY-MM-DD` form.
    #[error("Invalid day key: {0:?} (expected YYYY-MM-DD)")]
    InvalidDayKey(String),
}

/// Result type alias using greenwatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
