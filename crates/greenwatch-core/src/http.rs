//! HTTP reading source for a PostgREST-style endpoint.
//!
//! Enabled with the `http-source` feature.
//!
//! # Example
//!
//! ```no_run
//! use greenwatch_core::{HttpSource, ReadingSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new("https://example.supabase.co", "receive_dados", "anon-key")?;
//! let records = source.fetch_all().await?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use greenwatch_types::RawRecord;

use crate::config::{DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS, SourceConfig};
use crate::error::FetchError;
use crate::source::ReadingSource;

/// Error creating an [`HttpSource`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HttpSourceError {
    /// The base URL is not an http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The table name is empty.
    #[error("Table name must not be empty")]
    EmptyTable,

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reads every record of one table over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl HttpSource {
    /// Create a source with the default request timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The project URL (e.g., "https://example.supabase.co")
    /// * `table` - The table to read
    /// * `api_key` - Sent as both the `apikey` header and a bearer token
    pub fn new(base_url: &str, table: &str, api_key: &str) -> Result<Self, HttpSourceError> {
        Self::with_timeout(
            base_url,
            table,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(
        base_url: &str,
        table: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, HttpSourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, table, api_key, client)
    }

    /// Create a source with a custom reqwest Client.
    pub fn with_client(
        base_url: &str,
        table: &str,
        api_key: &str,
        client: Client,
    ) -> Result<Self, HttpSourceError> {
        let base_url = normalize_base_url(base_url)?;
        let table = table.trim();
        if table.is_empty() {
            return Err(HttpSourceError::EmptyTable);
        }

        Ok(Self {
            client,
            base_url,
            table: table.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a source from the `[source]` configuration section.
    pub fn from_config(config: &SourceConfig) -> Result<Self, HttpSourceError> {
        let table = if config.table.trim().is_empty() {
            DEFAULT_TABLE
        } else {
            config.table.as_str()
        };
        Self::with_timeout(
            &config.base_url,
            table,
            config.api_key.as_deref().unwrap_or_default(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The full URL that [`fetch_all`](ReadingSource::fetch_all) requests.
    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl ReadingSource for HttpSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.endpoint();
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("{url} not reachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());
            return Err(status_error(status, message));
        }

        response
            .json::<Vec<RawRecord>>()
            .await
            .map_err(|e| FetchError::Transport(format!("Undecodable response body: {e}")))
    }

    fn describe(&self) -> String {
        self.endpoint()
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, HttpSourceError> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(HttpSourceError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Ok(base_url)
}

fn status_error(status: StatusCode, message: String) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth(message),
        _ => FetchError::Transport(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_creation() {
        let source = HttpSource::new("https://example.supabase.co", "receive_dados", "key").unwrap();
        assert_eq!(source.base_url(), "https://example.supabase.co");
        assert_eq!(source.table(), "receive_dados");
        assert_eq!(
            source.endpoint(),
            "https://example.supabase.co/rest/v1/receive_dados"
        );
    }

    #[test]
    fn test_source_normalizes_url() {
        let source = HttpSource::new("http://localhost:54321/", "readings", "key").unwrap();
        assert_eq!(source.base_url(), "http://localhost:54321");
    }

    #[test]
    fn test_source_invalid_url() {
        let result = HttpSource::new("localhost:54321", "readings", "key");
        assert!(matches!(result, Err(HttpSourceError::InvalidUrl(_))));
    }

    #[test]
    fn test_source_empty_table() {
        let result = HttpSource::new("http://localhost", "  ", "key");
        assert!(matches!(result, Err(HttpSourceError::EmptyTable)));
    }

    #[test]
    fn test_from_config() {
        let config = SourceConfig {
            base_url: "https://example.supabase.co/".into(),
            api_key: Some("secret".into()),
            ..SourceConfig::default()
        };
        let source = HttpSource::from_config(&config).unwrap();
        assert_eq!(source.endpoint(), "https://example.supabase.co/rest/v1/receive_dados");
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::UNAUTHORIZED, "no".into()).is_auth());
        assert!(status_error(StatusCode::FORBIDDEN, "no".into()).is_auth());

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err, FetchError::Transport("HTTP 500: boom".into()));
        let err = status_error(StatusCode::NOT_FOUND, "missing".into());
        assert!(!err.is_auth());
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        let source = HttpSource::with_timeout(
            "http://127.0.0.1:9",
            "readings",
            "key",
            Duration::from_millis(500),
        )
        .unwrap();
        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
