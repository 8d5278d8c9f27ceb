// Application layer - use cases and the seams they depend on
pub mod aggregation_service;
pub mod discovery;
pub mod influxql;
pub mod latest_values;
pub mod live_cache;
pub mod query_client;
