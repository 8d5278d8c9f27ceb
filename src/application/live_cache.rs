// Live ingest cache - single writer, snapshot readers
use crate::domain::errors::ParseError;
use crate::domain::reading::Reading;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Connection state of the background subscription feeding the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribed,
    Faulted,
}

/// Holds the single most recent reading per station, fed by the streaming
/// subscription task. That task is the sole writer; readers only ever get
/// snapshot copies taken under a short read lock, so a snapshot is never
/// affected by later writer activity and no reader can observe a reading
/// mid-update.
pub struct LiveIngestCache {
    readings: RwLock<HashMap<String, Reading>>,
    state: RwLock<ConnectionState>,
}

impl LiveIngestCache {
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(HashMap::new()),
            state: RwLock::new(ConnectionState::Disconnected),
        }
    }

    /// Parses one inbound payload and swaps the complete reading into the
    /// cache. A malformed message leaves the cache untouched; the previous
    /// reading for that station survives.
    pub fn apply_payload(&self, payload: &[u8]) -> Result<(), ParseError> {
        let reading = Reading::from_payload(payload)?;

        let mut readings = self
            .readings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        readings.insert(reading.station_id.clone(), reading);
        Ok(())
    }

    /// Immutable snapshot of the whole cache.
    pub fn latest(&self) -> HashMap<String, Reading> {
        self.readings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent reading for one station, or None if never seen.
    pub fn latest_for(&self, station_id: &str) -> Option<Reading> {
        self.readings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(station_id)
            .cloned()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            tracing::debug!(from = ?*state, to = ?next, "live feed state change");
            *state = next;
        }
    }
}

impl Default for LiveIngestCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_invalid_message_preserves_previous_reading() {
        let cache = LiveIngestCache::new();
        cache
            .apply_payload(&payload(json!({
                "ID": "A", "Time": 1_700_000_000, "T": 5, "H": 40,
            })))
            .unwrap();

        // Missing the required temperature field.
        let err = cache
            .apply_payload(&payload(json!({
                "ID": "A", "Time": 1_700_000_060, "H": 45,
            })))
            .unwrap_err();
        assert_eq!(err, ParseError::MissingField("T"));

        let reading = cache.latest_for("A").unwrap();
        assert_eq!(reading.temperature, Some(5.0));
        assert_eq!(reading.humidity, Some(40.0));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let cache = LiveIngestCache::new();
        cache
            .apply_payload(&payload(json!({
                "ID": "A", "Time": 1_700_000_000, "T": 5, "H": 40,
            })))
            .unwrap();

        let snapshot = cache.latest();

        cache
            .apply_payload(&payload(json!({
                "ID": "A", "Time": 1_700_000_060, "T": 6, "H": 41,
            })))
            .unwrap();

        assert_eq!(snapshot["A"].temperature, Some(5.0));
        assert_eq!(cache.latest_for("A").unwrap().temperature, Some(6.0));
    }

    #[test]
    fn test_valid_message_replaces_the_whole_reading() {
        let cache = LiveIngestCache::new();
        cache
            .apply_payload(&payload(json!({
                "ID": "A", "Time": 1_700_000_000, "T": 5, "H": 40, "WSm": 3.2,
            })))
            .unwrap();
        cache
            .apply_payload(&payload(json!({
                "ID": "A", "Time": 1_700_000_060, "T": 6, "H": 41,
            })))
            .unwrap();

        let reading = cache.latest_for("A").unwrap();
        assert_eq!(reading.temperature, Some(6.0));
        // Replacement is complete, not field-by-field.
        assert_eq!(reading.wind_speed, None);
    }

    #[test]
    fn test_unseen_station_is_none() {
        assert!(LiveIngestCache::new().latest_for("nope").is_none());
    }

    #[test]
    fn test_state_transitions() {
        let cache = LiveIngestCache::new();
        assert_eq!(cache.state(), ConnectionState::Disconnected);
        cache.set_state(ConnectionState::Connecting);
        cache.set_state(ConnectionState::Subscribed);
        assert_eq!(cache.state(), ConnectionState::Subscribed);
        cache.set_state(ConnectionState::Faulted);
        assert_eq!(cache.state(), ConnectionState::Faulted);
    }
}
