// InfluxQL-over-HTTP query client
use crate::application::query_client::{QueryClient, QueryResponse};
use crate::domain::errors::{ConfigError, QueryError};
use crate::infrastructure::config::InfluxSettings;
use async_trait::async_trait;
use std::time::Duration;

/// Issues InfluxQL statements against the 1.x `/query` endpoint with basic
/// auth. Every request carries the configured timeout; transient failures
/// (transport errors, 5xx) are retried once, parse failures never.
#[derive(Debug, Clone)]
pub struct InfluxHttpClient {
    http: reqwest::Client,
    url: String,
    username: String,
    password: String,
    database: String,
}

impl InfluxHttpClient {
    pub fn new(settings: &InfluxSettings) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: settings.url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            database: settings.database.clone(),
        })
    }

    fn build_query_url(&self, statement: &str) -> String {
        format!(
            "{}/query?db={}&q={}",
            self.url,
            urlencoding::encode(&self.database),
            urlencoding::encode(statement)
        )
    }

    async fn execute(&self, statement: &str) -> Result<QueryResponse, QueryError> {
        let response = self
            .http
            .get(self.build_query_url(statement))
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| QueryError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::http(status.as_u16(), body));
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|err| QueryError::malformed(format!("unparseable response: {err}")))
    }
}

#[async_trait]
impl QueryClient for InfluxHttpClient {
    async fn query(&self, statement: &str) -> Result<QueryResponse, QueryError> {
        match self.execute(statement).await {
            Err(err) if err.transient => {
                tracing::warn!(error = %err, "transient query failure, retrying once");
                self.execute(statement).await
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> InfluxHttpClient {
        InfluxHttpClient::new(&InfluxSettings {
            url: "http://localhost:8086/".to_string(),
            username: "reader".to_string(),
            password: "secret".to_string(),
            database: "weather stations".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_build_query_url_encodes_statement_and_database() {
        let url = client().build_query_url("SHOW TAG VALUES WITH KEY = \"location\"");
        assert_eq!(
            url,
            "http://localhost:8086/query?db=weather%20stations\
             &q=SHOW%20TAG%20VALUES%20WITH%20KEY%20%3D%20%22location%22"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(QueryError::transport("connection reset").transient);
        assert!(QueryError::http(503, "unavailable").transient);
        assert!(!QueryError::http(400, "bad statement").transient);
        assert!(!QueryError::malformed("truncated json").transient);
    }
}
