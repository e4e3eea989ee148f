//! Event record normalization from raw source fields to a validated Record

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    EmptyIdentifier,
    InvalidTimestamp(String),
    MissingField(&'static str),
    NonTextField(&'static str),
    InvalidEncoding,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::EmptyIdentifier => write!(f, "Identifier cannot be an empty string"),
            RecordError::InvalidTimestamp(ts) => write!(f, "Cannot parse timestamp: {}", ts),
            RecordError::MissingField(field) => write!(f, "Missing field: {}", field),
            RecordError::NonTextField(field) => write!(f, "Field is not text: {}", field),
            RecordError::InvalidEncoding => write!(f, "Row is not valid UTF-8"),
        }
    }
}

impl std::error::Error for RecordError {}

/// One observed event. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    identifier: String,
    timestamp: DateTime<FixedOffset>,
}

impl Record {
    pub fn new(identifier: &str, timestamp: DateTime<FixedOffset>) -> Result<Self, RecordError> {
        Ok(Self {
            identifier: validate_identifier(identifier)?,
            timestamp,
        })
    }

    /// Build a record from raw identifier and timestamp text
    pub fn parse(identifier: &str, timestamp: &str) -> Result<Self, RecordError> {
        let timestamp = parse_timestamp(timestamp)?;
        Self::new(identifier, timestamp)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Calendar date in the timestamp's own offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Trim an identifier, rejecting one that is blank after trimming
pub fn validate_identifier(raw: &str) -> Result<String, RecordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecordError::EmptyIdentifier);
    }
    Ok(trimmed.to_string())
}

/// Byte-for-byte shape check: `D` is an ASCII digit, `±` is `+` or `-`,
/// anything else must match literally
fn has_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(b, s)| match s {
            b'D' => b.is_ascii_digit(),
            b'+' => b == b'+' || b == b'-',
            _ => b == s,
        })
}

/// Parse `YYYY-MM-DDTHH:MM:SS±HH:MM`
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, RecordError> {
    // chrono's numeric fields tolerate padding and signs, so pin the shape first
    if !has_shape(raw, "DDDD-DD-DDTDD:DD:DD+DD:DD") {
        return Err(RecordError::InvalidTimestamp(raw.to_string()));
    }
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%:z")
        .map_err(|_| RecordError::InvalidTimestamp(raw.to_string()))
}

/// Parse a `YYYY-MM-DD` calendar date. Returns None for garbled or impossible dates.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    if !has_shape(raw, "DDDD-DD-DD") {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_trimmed() {
        assert_eq!(validate_identifier(" random ").unwrap(), "random");
        assert_eq!(validate_identifier("random ").unwrap(), "random");
    }

    #[test]
    fn test_blank_identifier_rejected() {
        assert_eq!(validate_identifier(" "), Err(RecordError::EmptyIdentifier));
        assert_eq!(validate_identifier("\t  "), Err(RecordError::EmptyIdentifier));
        assert_eq!(validate_identifier(""), Err(RecordError::EmptyIdentifier));
    }

    #[test]
    fn test_valid_timestamp() {
        let ts = parse_timestamp("2020-12-26T00:00:00+00:00").unwrap();
        assert_eq!(ts.date_naive(), NaiveDate::from_ymd_opt(2020, 12, 26).unwrap());
    }

    #[test]
    fn test_invalid_timestamp() {
        assert_eq!(
            parse_timestamp("2020-26-26T00:00:00+00:00"),
            Err(RecordError::InvalidTimestamp("2020-26-26T00:00:00+00:00".to_string()))
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_layout_is_exact() {
        for raw in [
            "2018-12-09 14:19:00+00:00",
            "2018-12-09t14:19:00+00:00",
            "2018-12-09T14:19:00.123Z",
            "2018-12-09T14:19:00Z",
            "2018-12-09T14:19:00+0000",
            " 2018-12-09T14:19:00+00:00",
            "2018-12-09T14:19:00+00:00 ",
            "2018-12- 9T14:19:00+00:00",
        ] {
            assert!(parse_timestamp(raw).is_err(), "accepted {:?}", raw);
        }

        let ts = parse_timestamp("2018-12-09T14:19:00-05:30").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_record_date_uses_own_offset() {
        // 23:30 at -05:00 is already the next day in UTC
        let record = Record::parse("abc", "2018-12-08T23:30:00-05:00").unwrap();
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2018, 12, 8).unwrap());
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2012-02-03"), NaiveDate::from_ymd_opt(2012, 2, 3));
        assert_eq!(parse_day("2012-02-33"), None);
        assert_eq!(parse_day("5489965"), None);
        assert_eq!(parse_day("2012-2-3"), None);
        assert_eq!(parse_day("2013-02-29"), None);
        assert_eq!(parse_day("2012- 2-03"), None);
        assert_eq!(parse_day("+012-02-03"), None);
        assert_eq!(parse_day("2012-02- 3"), None);
        assert_eq!(parse_day("2012/02/03"), None);
        assert_eq!(parse_day("２012-02-03"), None);
    }
}
