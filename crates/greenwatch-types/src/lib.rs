//! Platform-agnostic types for greenhouse sensor readings.
//!
//! This crate provides the value types shared by the read engine
//! (greenwatch-core) and anything that consumes its output.
//!
//! # Features
//!
//! - [`Reading`], a validated temperature/humidity sample
//! - [`RawRecord`] and [`RawValue`], the loosely typed wire format
//! - [`DayKey`], the UTC calendar date used to partition readings
//! - [`parse_timestamp`], the one place source timestamps are interpreted
//!
//! # Example
//!
//! ```
//! use greenwatch_types::{DayKey, RawRecord};
//!
//! let record = RawRecord::new("2024-05-01T21:30:00-03:00", "27.5", "64");
//! let reading = record.parse()?;
//!
//! // 21:30 in UTC-3 is already the next day in UTC.
//! assert_eq!(reading.day_key(), "2024-05-02".parse::<DayKey>()?);
//! # Ok::<(), greenwatch_types::ParseError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{DayKey, RawRecord, RawValue, Reading, parse_timestamp};
