// Runtime schema discovery - locations and their measurement series
use crate::application::influxql;
use crate::application::query_client::QueryClient;
use crate::domain::errors::QueryError;
use serde_json::Value;
use std::collections::BTreeSet;

/// Enumerates the distinct station locations currently present in the
/// backing store. An empty set is valid (zero stations known); malformed
/// rows are skipped, not fatal.
pub async fn discover_locations(client: &dyn QueryClient) -> Result<BTreeSet<String>, QueryError> {
    let response = client.query(influxql::SHOW_LOCATIONS).await?;

    // SHOW TAG VALUES rows are [key, value] pairs.
    let locations: BTreeSet<String> = response
        .all_series()
        .flat_map(|series| &series.values)
        .filter_map(|row| row.get(1).and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    tracing::debug!(count = locations.len(), "discovered locations");
    Ok(locations)
}

/// Enumerates the measurement series recorded for one location.
pub async fn discover_measurements(
    client: &dyn QueryClient,
    location: &str,
) -> Result<BTreeSet<String>, QueryError> {
    let response = client.query(&influxql::show_measurements(location)).await?;

    // SHOW MEASUREMENTS rows carry the name in the first column.
    let measurements: BTreeSet<String> = response
        .all_series()
        .flat_map(|series| &series.values)
        .filter_map(|row| row.first().and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    tracing::debug!(
        location,
        count = measurements.len(),
        "discovered measurements"
    );
    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query_client::QueryResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixtureClient {
        response: QueryResponse,
    }

    impl FixtureClient {
        fn new(response: serde_json::Value) -> Self {
            Self {
                response: serde_json::from_value(response).unwrap(),
            }
        }
    }

    #[async_trait]
    impl QueryClient for FixtureClient {
        async fn query(&self, _statement: &str) -> Result<QueryResponse, QueryError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_extracts_locations_and_skips_malformed_rows() {
        let client = FixtureClient::new(json!({
            "results": [{
                "series": [{
                    "name": "measurements_with_location",
                    "columns": ["key", "value"],
                    "values": [
                        ["location", "Ort1"],
                        ["location"],
                        ["location", 42],
                        ["location", "Ort2"],
                    ],
                }],
            }],
        }));

        let locations = discover_locations(&client).await.unwrap();
        assert_eq!(
            locations,
            ["Ort1", "Ort2"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_sets() {
        let client = FixtureClient::new(json!({ "results": [{}] }));

        assert!(discover_locations(&client).await.unwrap().is_empty());
        assert!(
            discover_measurements(&client, "Ort1")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_extracts_measurement_names() {
        let client = FixtureClient::new(json!({
            "results": [{
                "series": [{
                    "name": "measurements",
                    "columns": ["name"],
                    "values": [["Temp0"], ["Hum0"], ["Time"]],
                }],
            }],
        }));

        let measurements = discover_measurements(&client, "Ort1").await.unwrap();
        assert_eq!(
            measurements,
            ["Hum0", "Temp0", "Time"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        );
    }
}
