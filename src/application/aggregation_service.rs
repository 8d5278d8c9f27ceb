// Aggregation orchestrator - discovery, batched fetch, enrichment, merge
use crate::application::query_client::QueryClient;
use crate::application::{discovery, latest_values};
use crate::domain::errors::{AggregationError, ErrorKind, QueryError};
use crate::domain::station::Station;
use crate::domain::timestamp;
use crate::infrastructure::coordinates::CoordinateTable;
use crate::application::latest_values::LatestValue;
use futures::StreamExt;
use futures::stream;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// Measurement series whose latest value carries the station timestamp.
const TIME_MEASUREMENT: &str = "Time";

/// Composes discovery, batched latest-value fetch, coordinate enrichment and
/// timestamp normalization into one location-keyed snapshot.
///
/// Partial-failure isolation is the defining property: a location whose
/// discovery or fetch fails keeps its slot in the result, annotated with the
/// error, and never aborts the other locations.
#[derive(Clone)]
pub struct AggregationService {
    client: Arc<dyn QueryClient>,
    coordinates: Arc<CoordinateTable>,
    worker_pool_size: usize,
}

impl AggregationService {
    pub fn new(
        client: Arc<dyn QueryClient>,
        coordinates: Arc<CoordinateTable>,
        worker_pool_size: usize,
    ) -> Self {
        Self {
            client,
            coordinates,
            worker_pool_size: worker_pool_size.max(1),
        }
    }

    /// Produces one Station per discovered location. A discovery failure is
    /// fatal to the whole call; everything after that is isolated per
    /// location. Tasks still pending when `timeout` elapses are cancelled
    /// and their locations marked degraded.
    pub async fn aggregate(&self, timeout: Duration) -> Result<BTreeMap<String, Station>, QueryError> {
        let locations = discovery::discover_locations(self.client.as_ref()).await?;
        let deadline = tokio::time::Instant::now() + timeout;

        let outcomes: Vec<_> = stream::iter(locations.into_iter().map(|location| {
            let client = Arc::clone(&self.client);
            async move {
                let fetched = tokio::time::timeout_at(
                    deadline,
                    fetch_station_values(client.as_ref(), &location),
                )
                .await;
                (location, fetched)
            }
        }))
        .buffer_unordered(self.worker_pool_size)
        .collect()
        .await;

        let mut stations = BTreeMap::new();
        for (location, outcome) in outcomes {
            let station = match outcome {
                Ok(Ok(values)) => self.build_station(&location, values),
                Ok(Err(err)) => {
                    tracing::warn!(%location, error = %err, "station fetch failed");
                    self.degraded_station(&location, ErrorKind::Query, err.to_string())
                }
                Err(_) => {
                    tracing::warn!(%location, ?timeout, "station fetch timed out");
                    self.degraded_station(
                        &location,
                        ErrorKind::Timeout,
                        format!("aggregation deadline of {}s elapsed", timeout.as_secs()),
                    )
                }
            };
            stations.insert(location, station);
        }

        tracing::info!(stations = stations.len(), "aggregation complete");
        Ok(stations)
    }

    fn build_station(&self, location: &str, values: BTreeMap<String, LatestValue>) -> Station {
        let mut station = Station::new(location, self.coordinates.lookup(location));

        for (measurement, latest) in values {
            if measurement == TIME_MEASUREMENT {
                match timestamp::normalize(&latest.value) {
                    Ok(normalized) => station.timestamp = Some(normalized),
                    // The raw value never leaks into the timestamp slot.
                    Err(err) => tracing::warn!(location, error = %err, "dropping timestamp"),
                }
            } else {
                station.readings.insert(measurement, latest.value.as_f64());
            }
        }

        station
    }

    fn degraded_station(&self, location: &str, kind: ErrorKind, message: String) -> Station {
        let mut station = Station::new(location, self.coordinates.lookup(location));
        station.error = Some(AggregationError::new(location, kind, message));
        station
    }
}

/// Per-location pipeline: measurement discovery, then one batched fetch.
/// Cooperative with cancellation: once the surrounding deadline fires the
/// future is dropped and no further statements are issued for the location.
async fn fetch_station_values(
    client: &dyn QueryClient,
    location: &str,
) -> Result<BTreeMap<String, LatestValue>, QueryError> {
    let measurements: BTreeSet<String> = discovery::discover_measurements(client, location).await?;
    latest_values::fetch_latest(client, location, &measurements).await
}
