use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc,
};
use thiserror::Error;

const LOCAL_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid datetime format: expected YYYY-MM-DD or YYYY-MM-DDTHH:MM")]
    InvalidDateTime,
    #[error("invalid ISO-8601 instant: {0}")]
    InvalidInstant(String),
    #[error("ambiguous local time: {0}")]
    AmbiguousLocalTime(String),
}

/// Current instant at millisecond precision, the resolution the wire format carries.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Parses a local date or date-time (as typed into a form) into a UTC instant.
pub fn parse_local_datetime(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or(TimeParseError::InvalidDate)?;
        return local_to_utc(naive);
    }

    for fmt in LOCAL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return local_to_utc(dt);
        }
    }

    Err(TimeParseError::InvalidDateTime)
}

/// Parses an instant from the wire. Values without an offset are read as UTC.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(TimeParseError::InvalidInstant(trimmed.to_string()))
}

/// Reads a server timestamp. Offset-less values are local wall-clock time.
pub fn parse_wire_datetime(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    match WireDateTime::parse(input)? {
        WireDateTime::Instant(value) => Ok(value),
        WireDateTime::Local(naive) => local_to_utc(naive),
    }
}

/// Renders a server timestamp for display. Offset-less values are shown as
/// sent; values with an offset are converted to local time.
pub fn format_wire_datetime(input: &str) -> Result<String, TimeParseError> {
    Ok(match WireDateTime::parse(input)? {
        WireDateTime::Instant(value) => format_local_datetime(value),
        WireDateTime::Local(naive) => naive.format(DISPLAY_FORMAT).to_string(),
    })
}

enum WireDateTime {
    Instant(DateTime<Utc>),
    Local(NaiveDateTime),
}

impl WireDateTime {
    fn parse(input: &str) -> Result<Self, TimeParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimeParseError::Empty);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(WireDateTime::Instant(dt.with_timezone(&Utc)));
        }
        LOCAL_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(WireDateTime::Local)
            .ok_or_else(|| TimeParseError::InvalidInstant(trimmed.to_string()))
    }
}

/// `2025-01-01T12:00:00.000Z`
pub fn format_instant(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn format_local_datetime(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Local representation accepted back by [`parse_local_datetime`].
pub fn format_local_input(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, TimeParseError> {
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimeParseError::AmbiguousLocalTime(naive.to_string()))?;
    Ok(local.with_timezone(&Utc))
}

/// Serde adapter writing instants as RFC 3339 UTC with milliseconds.
pub mod iso_millis {
    use super::{format_instant, parse_instant};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_instant(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_instant(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use super::format_instant;
        use chrono::{DateTime, Utc};
        use serde::Serializer;

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => serializer.serialize_str(&format_instant(*value)),
                None => serializer.serialize_none(),
            }
        }
    }
}
