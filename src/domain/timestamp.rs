// Timestamp normalization for backing-store values
use crate::domain::errors::ParseError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Canonical textual form for station timestamps.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Converts a raw timestamp value into the canonical form.
///
/// Accepts integer epoch seconds (converted via UTC) or a strict
/// `YYYY-MM-DDTHH:MM:SSZ` string. Any other shape is a `ParseError`; the
/// failure is never folded into the returned value, callers decide how to
/// surface it.
pub fn normalize(raw: &Value) -> Result<String, ParseError> {
    if let Some(epoch) = raw.as_i64() {
        let instant = DateTime::<Utc>::from_timestamp(epoch, 0)
            .ok_or_else(|| ParseError::InvalidTimestamp(raw.to_string()))?;
        return Ok(instant.format(TIMESTAMP_FORMAT).to_string());
    }

    if let Some(text) = raw.as_str() {
        let instant = NaiveDateTime::parse_from_str(text, ISO_FORMAT)
            .map_err(|_| ParseError::InvalidTimestamp(text.to_string()))?;
        return Ok(instant.format(TIMESTAMP_FORMAT).to_string());
    }

    Err(ParseError::InvalidTimestamp(raw.to_string()))
}
