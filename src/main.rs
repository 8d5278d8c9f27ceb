// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::aggregation_service::AggregationService;
use crate::application::live_cache::LiveIngestCache;
use crate::application::query_client::QueryClient;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::coordinates::CoordinateTable;
use crate::infrastructure::influx_client::InfluxHttpClient;
use crate::infrastructure::mqtt_ingest::MqttIngest;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_live_reading, get_live_readings, get_stations, health_check,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration and the static coordinate table (both fatal on failure)
    let settings = load_settings()?;
    let coordinates = Arc::new(CoordinateTable::load(&settings.coordinates.path)?);
    tracing::info!(locations = coordinates.len(), "loaded coordinate table");

    // Create the backing-store client (infrastructure layer)
    let query_client: Arc<dyn QueryClient> = Arc::new(InfluxHttpClient::new(&settings.influx)?);

    // Create services (application layer)
    let aggregation_service = AggregationService::new(
        query_client,
        coordinates,
        settings.aggregation.worker_pool_size,
    );
    let live_cache = Arc::new(LiveIngestCache::new());

    // Start the live ingest loop; a permanent feed failure marks the cache
    // faulted without taking the HTTP surface down
    tokio::spawn(MqttIngest::new(settings.mqtt.clone(), live_cache.clone()).run());

    // Create application state
    let state = Arc::new(AppState {
        aggregation_service,
        live_cache,
        aggregation_timeout: Duration::from_secs(settings.aggregation.timeout_secs),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/data", get(get_stations))
        .route("/api/live", get(get_live_readings))
        .route("/api/live/:id", get(get_live_reading))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.listen_addr.parse()?;
    tracing::info!(%addr, "starting weather-telemetry service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
