//! Core types for greenhouse sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::{ParseError, ParseResult};

/// Parse a source timestamp into an instant.
///
/// This is the single place where wire timestamps are interpreted. Accepted
/// forms, tried in order:
///
/// - RFC 3339 (`2024-05-01T12:00:00.123+00:00`, `2024-05-01T12:00:00Z`)
/// - RFC 3339 with an hour-only offset (`2024-05-01T12:00:00+00`)
/// - any other ISO 8601 date-time carrying an offset
/// - an ISO 8601 date-time without offset, taken as UTC
/// - a bare `YYYY-MM-DD` date, taken as UTC midnight
///
/// A space may replace the `T` separator, as PostgreSQL renders it.
///
/// # Examples
///
/// ```
/// use greenwatch_types::parse_timestamp;
/// use time::macros::datetime;
///
/// assert_eq!(
///     parse_timestamp("2024-05-01 23:30:00-03:00").unwrap(),
///     datetime!(2024-05-02 02:30:00 UTC),
/// );
/// assert!(parse_timestamp("yesterday").is_err());
/// ```
pub fn parse_timestamp(input: &str) -> ParseResult<OffsetDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::MissingField("created_at"));
    }

    // Byte 10 is a single-byte space here, so both slices sit on char boundaries.
    let normalized = if trimmed.len() > 10 && trimmed.as_bytes()[10] == b' ' {
        format!("{}T{}", &trimmed[..10], &trimmed[11..])
    } else {
        trimmed.to_string()
    };

    if let Ok(ts) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Ok(ts);
    }

    if has_hour_only_offset(&normalized) {
        let padded = format!("{}:00", normalized);
        if let Ok(ts) = OffsetDateTime::parse(&padded, &Rfc3339) {
            return Ok(ts);
        }
    }

    if let Ok(ts) = OffsetDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Ok(ts);
    }

    if let Ok(naive) = PrimitiveDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Ok(naive.assume_utc());
    }

    if let Ok(date) = Date::parse(&normalized, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight().assume_utc());
    }

    Err(ParseError::InvalidTimestamp(input.to_string()))
}

/// True when the string ends in `+hh` / `-hh` right after a time component.
fn has_hour_only_offset(s: &str) -> bool {
    let bytes = s.as_bytes();
    let n = bytes.len();
    n > 13
        && matches!(bytes[n - 3], b'+' | b'-')
        && bytes[n - 2].is_ascii_digit()
        && bytes[n - 1].is_ascii_digit()
        && bytes[n - 4].is_ascii_digit()
        && s[..n - 3].contains('T')
}

/// A UTC calendar date used to bucket readings.
///
/// Two readings share a `DayKey` iff their timestamps fall on the same UTC
/// calendar date, whatever offset the source attached to them. Every date
/// comparison in the workspace goes through [`DayKey::from_timestamp`].
///
/// Keys order chronologically, and format as `YYYY-MM-DD`.
///
/// ```
/// use greenwatch_types::DayKey;
/// use time::macros::datetime;
///
/// let late_evening_brt = datetime!(2024-05-01 22:00:00 -03:00);
/// assert_eq!(DayKey::from_timestamp(late_evening_brt).to_string(), "2024-05-02");
///
/// let key: DayKey = "2024-05-01".parse().unwrap();
/// assert!(key < DayKey::from_timestamp(late_evening_brt));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct DayKey(Date);

impl DayKey {
    /// Derive the key for an instant by truncating it to its UTC date.
    #[must_use]
    pub fn from_timestamp(timestamp: OffsetDateTime) -> Self {
        Self(timestamp.to_offset(UtcOffset::UTC).date())
    }

    /// Wrap a calendar date.
    #[must_use]
    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    /// Build a key from year, month (1-12) and day.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> ParseResult<Self> {
        let invalid = || ParseError::InvalidDayKey(format!("{:04}-{:02}-{:02}", year, month, day));
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// The key for the current UTC date.
    #[must_use]
    pub fn today() -> Self {
        Self::from_timestamp(OffsetDateTime::now_utc())
    }

    /// The underlying calendar date.
    #[must_use]
    pub fn date(&self) -> Date {
        self.0
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month of the year, 1-12.
    #[must_use]
    pub fn month(&self) -> u8 {
        u8::from(self.0.month())
    }

    /// Day of the month, 1-31.
    #[must_use]
    pub fn day(&self) -> u8 {
        self.0.day()
    }

    /// UTC midnight at the start of this day.
    #[must_use]
    pub fn start(&self) -> OffsetDateTime {
        self.0.midnight().assume_utc()
    }

    /// Whether `timestamp` falls on this UTC day.
    #[must_use]
    pub fn contains(&self, timestamp: OffsetDateTime) -> bool {
        Self::from_timestamp(timestamp) == *self
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for DayKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(|_| ParseError::InvalidDayKey(s.to_string()))
    }
}

impl TryFrom<String> for DayKey {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.to_string()
    }
}

impl From<Date> for DayKey {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

/// One temperature/humidity sample.
///
/// Readings are immutable values; they are only ever produced from a
/// [`RawRecord`] that parsed cleanly, or built directly in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the sample was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Temperature in Celsius.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
}

impl Reading {
    /// Create a reading.
    #[must_use]
    pub fn new(timestamp: OffsetDateTime, temperature: f64, humidity: f64) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
        }
    }

    /// The UTC day this reading belongs to.
    #[must_use]
    pub fn day_key(&self) -> DayKey {
        DayKey::from_timestamp(self.timestamp)
    }

    /// Comparator placing newer readings first.
    ///
    /// Suitable for `sort_by`; the sort is stable, so equal timestamps keep
    /// their relative order.
    pub fn newest_first(a: &Reading, b: &Reading) -> core::cmp::Ordering {
        b.timestamp.cmp(&a.timestamp)
    }
}

/// A loosely typed field value as it arrives from the data source.
///
/// The upstream table stores numbers as text (`"23.5"`) but some rows carry
/// real JSON numbers; both are accepted.
///
/// Decoding never fails on a field's shape: booleans become [`Flag`] and
/// objects, arrays or nulls become [`Unsupported`], both of which the
/// validating accessors reject. One odd row is then dropped instead of
/// failing the whole response.
///
/// [`Flag`]: RawValue::Flag
/// [`Unsupported`]: RawValue::Unsupported
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum RawValue {
    /// A JSON number.
    Number(f64),
    /// A JSON string.
    Text(String),
    /// A JSON boolean. Never valid for any field.
    Flag(bool),
    /// An object, array or null. Never valid for any field.
    Unsupported,
}

impl RawValue {
    /// Interpret the value as a finite number.
    pub fn as_number(&self, field: &'static str) -> ParseResult<f64> {
        let invalid = || ParseError::InvalidNumber {
            field,
            value: self.to_string(),
        };
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
            RawValue::Flag(_) | RawValue::Unsupported => return Err(invalid()),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid())
        }
    }

    /// Interpret the value as a timestamp.
    ///
    /// Text goes through [`parse_timestamp`]; a number is taken as Unix
    /// epoch milliseconds.
    pub fn as_timestamp(&self) -> ParseResult<OffsetDateTime> {
        match self {
            RawValue::Text(s) => parse_timestamp(s),
            RawValue::Number(ms) if ms.is_finite() => {
                let nanos = (*ms * 1_000_000.0) as i128;
                OffsetDateTime::from_unix_timestamp_nanos(nanos)
                    .map_err(|_| ParseError::InvalidTimestamp(self.to_string()))
            }
            _ => Err(ParseError::InvalidTimestamp(self.to_string())),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Flag(b) => write!(f, "{}", b),
            RawValue::Unsupported => write!(f, "<unsupported>"),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

#[cfg(feature = "serde")]
struct RawValueVisitor;

#[cfg(feature = "serde")]
impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawValue, E> {
        Ok(RawValue::Flag(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawValue, E> {
        Ok(RawValue::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawValue, E> {
        Ok(RawValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawValue, E> {
        Ok(RawValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Unsupported)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Unsupported)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawValue, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawValue::Unsupported)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawValue, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RawValue::Unsupported)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// One row as returned by the data source, before validation.
///
/// Field names follow the upstream table (`created_at`, `temperatura`,
/// `umidade`); the English names are accepted as aliases. Unknown columns
/// such as `id` are ignored.
///
/// An array element that is not an object (`null`, a number, a nested
/// array) decodes to a record with no fields, which fails validation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RawRecord {
    /// Capture time.
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: Option<RawValue>,
    /// Temperature in Celsius.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "temperatura", alias = "temperature")
    )]
    pub temperature: Option<RawValue>,
    /// Relative humidity percentage.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "umidade", alias = "humidity")
    )]
    pub humidity: Option<RawValue>,
}

/// The object form of a [`RawRecord`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RecordFields {
    #[serde(default)]
    created_at: Option<RawValue>,
    #[serde(default, rename = "temperatura", alias = "temperature")]
    temperature: Option<RawValue>,
    #[serde(default, rename = "umidade", alias = "humidity")]
    humidity: Option<RawValue>,
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawRecordVisitor)
    }
}

#[cfg(feature = "serde")]
struct RawRecordVisitor;

#[cfg(feature = "serde")]
impl<'de> Visitor<'de> for RawRecordVisitor {
    type Value = RawRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a record object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<RawRecord, A::Error> {
        let fields = RecordFields::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(RawRecord {
            created_at: fields.created_at,
            temperature: fields.temperature,
            humidity: fields.humidity,
        })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawRecord, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawRecord::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<RawRecord, E> {
        Ok(RawRecord::default())
    }
}

impl RawRecord {
    /// Create a record with every field present.
    pub fn new(
        created_at: impl Into<RawValue>,
        temperature: impl Into<RawValue>,
        humidity: impl Into<RawValue>,
    ) -> Self {
        Self {
            created_at: Some(created_at.into()),
            temperature: Some(temperature.into()),
            humidity: Some(humidity.into()),
        }
    }

    /// Validate this record into a [`Reading`].
    pub fn parse(&self) -> ParseResult<Reading> {
        let timestamp = self
            .created_at
            .as_ref()
            .ok_or(ParseError::MissingField("created_at"))?
            .as_timestamp()?;
        let temperature = self
            .temperature
            .as_ref()
            .ok_or(ParseError::MissingField("temperatura"))?
            .as_number("temperatura")?;
        let humidity = self
            .humidity
            .as_ref()
            .ok_or(ParseError::MissingField("umidade"))?
            .as_number("umidade")?;

        Ok(Reading::new(timestamp, temperature, humidity))
    }
}

impl TryFrom<&RawRecord> for Reading {
    type Error = ParseError;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        record.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    // --- parse_timestamp ---

    #[test]
    fn test_parse_rfc3339_with_fraction() {
        let ts = parse_timestamp("2024-05-01T12:34:56.123456+00:00").unwrap();
        assert_eq!(ts.date(), date!(2024 - 05 - 01));
        assert_eq!(ts.microsecond(), 123_456);
    }

    #[test]
    fn test_parse_zulu() {
        let ts = parse_timestamp("2024-05-01T00:00:00Z").unwrap();
        assert_eq!(ts, datetime!(2024-05-01 00:00:00 UTC));
    }

    #[test]
    fn test_parse_space_separator() {
        let ts = parse_timestamp("2024-05-01 08:15:00+02:00").unwrap();
        assert_eq!(ts, datetime!(2024-05-01 06:15:00 UTC));
    }

    #[test]
    fn test_parse_hour_only_offset() {
        let ts = parse_timestamp("2024-05-01 08:15:00.5+00").unwrap();
        assert_eq!(ts, datetime!(2024-05-01 08:15:00.5 UTC));

        let ts = parse_timestamp("2024-05-01T21:00:00-03").unwrap();
        assert_eq!(ts, datetime!(2024-05-02 00:00:00 UTC));
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = parse_timestamp("2024-05-01T12:30:00").unwrap();
        assert_eq!(ts, datetime!(2024-05-01 12:30:00 UTC));
    }

    #[test]
    fn test_parse_bare_date_is_utc_midnight() {
        let ts = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(ts, datetime!(2024-05-01 00:00:00 UTC));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("not a date"),
            Err(ParseError::InvalidTimestamp(_))
        ));
        assert!(parse_timestamp("2024-13-01T00:00:00Z").is_err());
        assert!(parse_timestamp("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_empty_is_missing() {
        assert_eq!(
            parse_timestamp("   "),
            Err(ParseError::MissingField("created_at"))
        );
    }

    // --- DayKey ---

    #[test]
    fn test_day_key_uses_utc_date() {
        let a = datetime!(2024-05-01 23:59:59 -03:00);
        let b = datetime!(2024-05-02 00:00:01 UTC);
        assert_eq!(DayKey::from_timestamp(a), DayKey::from_timestamp(b));

        let c = datetime!(2024-05-02 01:00:00 +03:00);
        assert_eq!(DayKey::from_timestamp(c).to_string(), "2024-05-01");
    }

    #[test]
    fn test_day_key_display_and_parse() {
        let key = DayKey::from_ymd(2024, 5, 1).unwrap();
        assert_eq!(key.to_string(), "2024-05-01");
        assert_eq!("2024-05-01".parse::<DayKey>().unwrap(), key);
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 5);
        assert_eq!(key.day(), 1);
    }

    #[test]
    fn test_day_key_rejects_invalid() {
        assert!(DayKey::from_ymd(2024, 13, 1).is_err());
        assert!(DayKey::from_ymd(2023, 2, 29).is_err());
        assert!(matches!(
            "05/01/2024".parse::<DayKey>(),
            Err(ParseError::InvalidDayKey(_))
        ));
    }

    #[test]
    fn test_day_key_ordering_is_chronological() {
        let mut keys = vec![
            DayKey::from_ymd(2024, 5, 2).unwrap(),
            DayKey::from_ymd(2023, 12, 31).unwrap(),
            DayKey::from_ymd(2024, 5, 1).unwrap(),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["2023-12-31", "2024-05-01", "2024-05-02"]);
    }

    #[test]
    fn test_day_key_start_and_contains() {
        let key = DayKey::from_ymd(2024, 5, 1).unwrap();
        assert_eq!(key.start(), datetime!(2024-05-01 00:00:00 UTC));
        assert!(key.contains(datetime!(2024-05-01 23:59:59 UTC)));
        assert!(!key.contains(datetime!(2024-05-01 22:00:00 -03:00)));
    }

    // --- RawValue / RawRecord ---

    #[test]
    fn test_raw_value_numbers() {
        assert_eq!(RawValue::from("23.5").as_number("t").unwrap(), 23.5);
        assert_eq!(RawValue::from(" 61 ").as_number("t").unwrap(), 61.0);
        assert_eq!(RawValue::Number(-4.25).as_number("t").unwrap(), -4.25);
        assert!(RawValue::from("23,5").as_number("t").is_err());
        assert!(RawValue::from("NaN").as_number("t").is_err());
        assert!(RawValue::Flag(true).as_number("t").is_err());
        assert!(RawValue::Unsupported.as_number("t").is_err());
        assert!(RawValue::Unsupported.as_timestamp().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_raw_value_odd_shapes_decode() {
        let value: RawValue = serde_json::from_str(r#"{"v": 1}"#).unwrap();
        assert_eq!(value, RawValue::Unsupported);
        let value: RawValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(value, RawValue::Unsupported);
        let value: RawValue = serde_json::from_str("7").unwrap();
        assert_eq!(value, RawValue::Number(7.0));
        let value: RawValue = serde_json::from_str("false").unwrap();
        assert_eq!(value, RawValue::Flag(false));
    }

    #[test]
    fn test_raw_value_epoch_millis() {
        let ts = RawValue::Number(1_714_521_600_000.0).as_timestamp().unwrap();
        assert_eq!(ts, datetime!(2024-05-01 00:00:00 UTC));
    }

    #[test]
    fn test_record_parse_ok() {
        let record = RawRecord::new("2024-05-01T10:00:00Z", "24.1", "55");
        let reading = record.parse().unwrap();
        assert_eq!(reading.timestamp, datetime!(2024-05-01 10:00:00 UTC));
        assert_eq!(reading.temperature, 24.1);
        assert_eq!(reading.humidity, 55.0);
        assert_eq!(reading.day_key().to_string(), "2024-05-01");
    }

    #[test]
    fn test_record_parse_missing_fields() {
        let record = RawRecord {
            created_at: None,
            ..RawRecord::new("2024-05-01", "1", "2")
        };
        assert_eq!(
            record.parse(),
            Err(ParseError::MissingField("created_at"))
        );

        let record = RawRecord {
            humidity: None,
            ..RawRecord::new("2024-05-01", "1", "2")
        };
        assert_eq!(record.parse(), Err(ParseError::MissingField("umidade")));
    }

    #[test]
    fn test_newest_first_comparator() {
        let older = Reading::new(datetime!(2024-05-01 10:00 UTC), 20.0, 50.0);
        let newer = Reading::new(datetime!(2024-05-01 11:00 UTC), 21.0, 51.0);
        let mut readings = vec![older, newer];
        readings.sort_by(Reading::newest_first);
        assert_eq!(readings, vec![newer, older]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_raw_record_deserialize_wire_format() {
        let json = r#"[
            {"id": 7, "created_at": "2024-05-01T10:00:00+00:00", "temperatura": "24.5", "umidade": "60"},
            {"id": 8, "created_at": null, "temperatura": 22, "umidade": 58.5},
            {"created_at": "2024-05-01T11:00:00Z", "temperature": "25", "humidity": "61"}
        ]"#;
        let records: Vec<RawRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].temperature, Some(RawValue::from("24.5")));
        assert_eq!(records[1].created_at, None);
        assert_eq!(records[1].temperature, Some(RawValue::Number(22.0)));
        assert_eq!(records[2].humidity, Some(RawValue::from("61")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_day_key_serde_as_string() {
        let key = DayKey::from_ymd(2024, 5, 1).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-05-01\"");
        let back: DayKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<DayKey>("\"May 1\"").is_err());
    }
}
