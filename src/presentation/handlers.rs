// HTTP request handlers
use crate::presentation::app_state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Aggregated snapshot of all stations known to the backing store.
pub async fn get_stations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state
        .aggregation_service
        .aggregate(state.aggregation_timeout)
        .await
    {
        Ok(stations) => Json(stations).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "aggregation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// Snapshot of the live cache, one reading per station.
pub async fn get_live_readings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.live_cache.latest())
}

/// Most recent live reading for one station.
pub async fn get_live_reading(
    Path(station_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.live_cache.latest_for(&station_id) {
        Some(reading) => Json(reading).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no data available for station {station_id}") })),
        )
            .into_response(),
    }
}
