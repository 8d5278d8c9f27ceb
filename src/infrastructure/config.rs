// Settings loading
use crate::domain::errors::ConfigError;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub influx: InfluxSettings,
    pub mqtt: MqttSettings,
    #[serde(default)]
    pub aggregation: AggregationSettings,
    pub coordinates: CoordinateSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub url: String,
    pub username: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub topic: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregationSettings {
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            worker_pool_size: default_worker_pool_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoordinateSettings {
    pub path: String,
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_client_id() -> String {
    "weather-telemetry".to_string()
}

fn default_max_retries() -> u32 {
    10
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_worker_pool_size() -> usize {
    8
}

fn default_timeout_secs() -> u64 {
    10
}

/// Loads `config/settings.toml`, then applies `WEATHER__`-prefixed
/// environment overrides (e.g. `WEATHER__INFLUX__PASSWORD`).
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/settings"))
        .add_source(config::Environment::with_prefix("WEATHER").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        listen_addr = "0.0.0.0:8000"

        [influx]
        url = "http://localhost:8086"
        username = "reader"
        password = "secret"
        database = "weather_stations"

        [mqtt]
        host = "localhost"
        port = 1883
        username = "reader"
        password = "secret"
        topic = "weather/stations/json"

        [coordinates]
        path = "config/coordinates.json"
    "#;

    #[test]
    fn test_defaults_apply_when_optional_keys_are_omitted() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(MINIMAL, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.influx.request_timeout_secs, 5);
        assert_eq!(settings.aggregation.worker_pool_size, 8);
        assert_eq!(settings.aggregation.timeout_secs, 10);
        assert_eq!(settings.mqtt.max_retries, 10);
        assert_eq!(settings.mqtt.initial_backoff_ms, 500);
        assert_eq!(settings.mqtt.max_backoff_secs, 60);
        assert_eq!(settings.mqtt.client_id, "weather-telemetry");
    }
}
