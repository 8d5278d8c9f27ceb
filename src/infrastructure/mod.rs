// Infrastructure layer - external dependencies and adapters
pub mod config;
pub mod coordinates;
pub mod influx_client;
pub mod mqtt_ingest;
