// Live reading domain model - one record per station in the push path
use crate::domain::errors::ParseError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Most recent reading received for one station over the live feed.
///
/// Constructed in full from a single payload or not at all; the cache never
/// holds a partially populated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    #[serde(rename = "name")]
    pub station_id: String,
    pub timestamp: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_angle: Option<f64>,
    pub rainfall: Option<f64>,
    pub battery: Option<Value>,
    pub gateway_id: Option<String>,
    pub pc: Option<Value>,
}

impl Reading {
    /// Parses a raw feed payload. `ID`, `Time`, `T` and `H` are required;
    /// a present-but-unconvertible numeric field fails the whole message.
    pub fn from_payload(payload: &[u8]) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|err| ParseError::InvalidJson(err.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| ParseError::InvalidJson("payload is not a json object".to_string()))?;

        let station_id = object
            .get("ID")
            .and_then(Value::as_str)
            .ok_or(ParseError::MissingField("ID"))?
            .to_string();
        let timestamp = object
            .get("Time")
            .and_then(timestamp_text)
            .ok_or(ParseError::MissingField("Time"))?;

        Ok(Self {
            station_id,
            timestamp: Some(timestamp),
            temperature: Some(required_number(object, "T")?),
            humidity: Some(required_number(object, "H")?),
            wind_speed: optional_number(object, "WSm")?,
            wind_angle: optional_number(object, "WD")?,
            rainfall: optional_number(object, "R")?,
            battery: present(object, "Bat"),
            gateway_id: object
                .get("GWID")
                .and_then(Value::as_str)
                .map(str::to_string),
            pc: present(object, "PC"),
        })
    }
}

// Feeds have been observed sending numbers as quoted strings.
fn number_from(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
}

fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn required_number(object: &Map<String, Value>, field: &'static str) -> Result<f64, ParseError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ParseError::MissingField(field)),
        Some(value) => number_from(value).ok_or(ParseError::InvalidNumber(field)),
    }
}

fn optional_number(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, ParseError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => number_from(value)
            .map(Some)
            .ok_or(ParseError::InvalidNumber(field)),
    }
}

fn present(object: &Map<String, Value>, field: &str) -> Option<Value> {
    object.get(field).filter(|value| !value.is_null()).cloned()
}
