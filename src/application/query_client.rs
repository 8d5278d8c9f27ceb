// Backing-store query seam and the raw response shapes it returns
use crate::domain::errors::QueryError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Issues one InfluxQL statement (or a `;`-batched group) against the
/// backing store. Implemented by the HTTP adapter in production and by
/// canned fixtures in tests.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn query(&self, statement: &str) -> Result<QueryResponse, QueryError>;
}

/// Raw `results -> series -> values` structure of an InfluxQL response.
/// Treated as untrusted: every field is optional and extraction code skips
/// whatever is missing or malformed. Never retained past the call that
/// produced it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub series: Option<Vec<Series>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl QueryResponse {
    /// Flattens the nested structure into an iterator over series.
    pub fn all_series(&self) -> impl Iterator<Item = &Series> {
        self.results
            .iter()
            .filter_map(|result| result.series.as_ref())
            .flatten()
    }
}
