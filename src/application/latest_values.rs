// Batched latest-value fetch for one location
use crate::application::influxql;
use crate::application::query_client::QueryClient;
use crate::domain::errors::QueryError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Latest recorded value of one measurement, together with the raw time
/// column of the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestValue {
    pub value: Value,
    pub row_time: Option<String>,
}

/// Fetches the most recent value of every measurement for a location with a
/// single batched statement. Measurements absent from the response and
/// series with zero rows are omitted silently.
pub async fn fetch_latest(
    client: &dyn QueryClient,
    location: &str,
    measurements: &BTreeSet<String>,
) -> Result<BTreeMap<String, LatestValue>, QueryError> {
    if measurements.is_empty() {
        return Ok(BTreeMap::new());
    }

    let statement = influxql::select_last_batch(location, measurements);
    let response = client.query(&statement).await?;

    let mut latest = BTreeMap::new();
    for series in response.all_series() {
        // LAST(*) yields a single row per series: [time, last_<field>, ...].
        let Some(row) = series.values.first() else {
            continue;
        };
        let Some(value) = row.get(1) else {
            continue;
        };
        latest.insert(
            series.name.clone(),
            LatestValue {
                value: value.clone(),
                row_time: row.first().and_then(Value::as_str).map(str::to_string),
            },
        );
    }

    tracing::debug!(
        location,
        requested = measurements.len(),
        fetched = latest.len(),
        "fetched latest values"
    );
    Ok(latest)
}
