//! Decoding of source rows as the REST endpoint returns them.

use greenwatch_types::{DayKey, ParseError, RawRecord, RawValue};
use time::macros::datetime;

const RESPONSE: &str = r#"[
    {"id": 1, "created_at": "2024-05-01T12:00:00.123456+00:00", "temperatura": "23.5", "umidade": "61"},
    {"id": 2, "created_at": "2024-05-01 23:30:00-03", "temperatura": 31, "umidade": 48.5},
    {"id": 3, "created_at": null, "temperatura": "20", "umidade": "50"},
    {"id": 4, "created_at": "2024-05-02T08:00:00Z", "temperatura": "", "umidade": "50"},
    {"id": 5, "created_at": "2024-05-02T09:00:00Z", "temperatura": true, "umidade": "50"},
    {"id": 6, "created_at": 1714640400000, "temperature": "22", "humidity": "55"}
]"#;

fn rows() -> Vec<RawRecord> {
    serde_json::from_str(RESPONSE).unwrap()
}

#[test]
fn decodes_every_row() {
    let rows = rows();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[1].temperature, Some(RawValue::Number(31.0)));
    assert_eq!(rows[2].created_at, None);
    assert_eq!(rows[4].temperature, Some(RawValue::Flag(true)));
}

#[test]
fn valid_rows_parse() {
    let rows = rows();

    let first = rows[0].parse().unwrap();
    assert_eq!(first.temperature, 23.5);
    assert_eq!(first.humidity, 61.0);
    assert_eq!(first.day_key(), "2024-05-01".parse::<DayKey>().unwrap());

    let second = rows[1].parse().unwrap();
    assert_eq!(second.timestamp, datetime!(2024-05-02 02:30 UTC));
    assert_eq!(second.humidity, 48.5);

    let sixth = rows[5].parse().unwrap();
    assert_eq!(sixth.timestamp, datetime!(2024-05-02 09:00 UTC));
    assert_eq!(sixth.temperature, 22.0);
}

#[test]
fn invalid_rows_report_why() {
    let rows = rows();

    assert_eq!(rows[2].parse(), Err(ParseError::MissingField("created_at")));
    assert!(matches!(
        rows[3].parse(),
        Err(ParseError::InvalidNumber { field: "temperatura", .. })
    ));
    assert!(matches!(
        rows[4].parse(),
        Err(ParseError::InvalidNumber { field: "temperatura", .. })
    ));
}

#[test]
fn reading_serializes_rfc3339() {
    let reading = rows()[5].parse().unwrap();
    let json = serde_json::to_value(reading).unwrap();
    assert_eq!(json["timestamp"], "2024-05-02T09:00:00Z");
    assert_eq!(json["temperature"], 22.0);
}

#[test]
fn day_key_serializes_as_text() {
    let key: DayKey = "2024-05-01".parse().unwrap();
    assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-05-01\"");
    assert_eq!(serde_json::from_str::<DayKey>("\"2024-05-01\"").unwrap(), key);
    assert!(serde_json::from_str::<DayKey>("\"2024-13-01\"").is_err());
}

#[test]
fn odd_rows_do_not_fail_the_response() {
    let json = r#"[
        {"id": 1, "created_at": "2024-05-01T12:00:00Z", "temperatura": "23.5", "umidade": "61"},
        {"id": 2, "created_at": "2024-05-01T13:00:00Z", "temperatura": {"v": 1}, "umidade": "60"},
        null,
        {"id": 3, "created_at": ["2024-05-01"], "temperatura": "22", "umidade": [1, 2]},
        42,
        {"id": 4, "created_at": "2024-05-02T08:00:00Z", "temperatura": 24, "umidade": 58}
    ]"#;

    let rows: Vec<RawRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[1].temperature, Some(RawValue::Unsupported));
    assert_eq!(rows[2], RawRecord::default());
    assert_eq!(rows[4], RawRecord::default());

    let valid: Vec<_> = rows.iter().filter_map(|r| r.parse().ok()).collect();
    assert_eq!(valid.len(), 2);
    assert_eq!(valid[0].temperature, 23.5);
    assert_eq!(valid[1].humidity, 58.0);

    assert!(matches!(
        rows[1].parse(),
        Err(ParseError::InvalidNumber { field: "temperatura", .. })
    ));
    assert_eq!(rows[2].parse(), Err(ParseError::MissingField("created_at")));
    assert!(matches!(rows[3].parse(), Err(ParseError::InvalidTimestamp(_))));
}
