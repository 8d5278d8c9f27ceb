// Station domain model - one record per location in an aggregation snapshot
use crate::domain::errors::AggregationError;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Planar coordinates of a station, loaded once at startup. Absence of a
/// coordinate for a location is a valid state, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// One aggregated station record. Created fresh on each aggregation run and
/// never mutated after being placed in the result map.
///
/// Serializes as `{ location, x, y, timestamp, <measurement>: number|null,
/// error?: string }` with coordinates flattened and omitted when unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub location: String,
    #[serde(flatten)]
    pub coordinates: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub readings: BTreeMap<String, Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    pub error: Option<AggregationError>,
}

impl Station {
    pub fn new(location: &str, coordinates: Option<Coordinate>) -> Self {
        Self {
            location: location.to_string(),
            coordinates,
            timestamp: None,
            readings: BTreeMap::new(),
            error: None,
        }
    }
}

// The wire format carries only the message string; the structured kind stays
// internal to the service.
fn error_message<S>(error: &Option<AggregationError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.serialize_str(&err.message),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_serializes_readings_and_coordinates_flat() {
        let mut station = Station::new("Ort1", Some(Coordinate { x: 8.46, y: 49.49 }));
        station.timestamp = Some("14.11.2023 22:13:20".to_string());
        station.readings.insert("Temp0".to_string(), Some(21.3));
        station.readings.insert("Hum0".to_string(), None);

        let value = serde_json::to_value(&station).unwrap();
        assert_eq!(
            value,
            json!({
                "location": "Ort1",
                "x": 8.46,
                "y": 49.49,
                "timestamp": "14.11.2023 22:13:20",
                "Temp0": 21.3,
                "Hum0": null,
            })
        );
    }

    #[test]
    fn test_serializes_error_as_message_string() {
        let mut station = Station::new("Ort2", None);
        station.error = Some(AggregationError::new(
            "Ort2",
            ErrorKind::Query,
            "backing store returned status 503: unavailable",
        ));

        let value = serde_json::to_value(&station).unwrap();
        assert_eq!(
            value,
            json!({
                "location": "Ort2",
                "error": "backing store returned status 503: unavailable",
            })
        );
    }
}
