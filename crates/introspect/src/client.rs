//! Configurable GraphQL introspection client.
//!
//! This module provides a client for executing introspection and version
//! discovery queries with support for custom headers, timeouts, and retry logic.

use crate::{
    ApiVersion, IntrospectionError, IntrospectionSchema, Result, INTROSPECTION_QUERY,
    PUBLIC_API_VERSIONS_QUERY,
};
use std::collections::HashMap;
use std::time::Duration;

/// Default timeout for introspection requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default number of retry attempts.
const DEFAULT_RETRIES: u32 = 0;

/// A configurable client for the schema endpoints.
///
/// The client supports:
/// - Custom HTTP headers (e.g., access tokens)
/// - Configurable request timeout
/// - Automatic retry with exponential backoff
///
/// # Examples
///
/// ```no_run
/// use query_analyzer_introspect::IntrospectionClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = IntrospectionClient::new()
///     .with_header("X-Shopify-Access-Token", "shpat_...")
///     .with_retries(2);
/// let versions = client
///     .public_api_versions("https://myshop.myshopify.com/admin/api/2024-10/graphql.json")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IntrospectionClient {
    headers: HashMap<String, String>,
    timeout: Duration,
    connect_timeout: Duration,
    retries: u32,
}

impl Default for IntrospectionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IntrospectionClient {
    /// Creates a new client with default settings.
    ///
    /// Default settings:
    /// - 30 second request timeout
    /// - 10 second connection timeout
    /// - No retries
    /// - No custom headers
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Adds a custom HTTP header to be sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds multiple HTTP headers from an iterator.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
        self
    }

    /// Sets the request timeout (connection + transfer). Default is 30 seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout. Default is 10 seconds.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the number of retry attempts on failure.
    ///
    /// Retries use exponential backoff starting at 1 second.
    /// Default is 0 (no retries).
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Executes the introspection query and returns the raw `data` payload.
    ///
    /// The returned JSON has a top-level `__schema` key and is exactly what
    /// gets written to the schema cache.
    #[tracing::instrument(skip(self))]
    pub async fn execute_raw(&self, url: &str) -> Result<serde_json::Value> {
        let data = self.query(url, INTROSPECTION_QUERY).await?;
        if IntrospectionSchema::locate(&data).is_none() {
            return Err(IntrospectionError::Invalid(
                "response has no __schema".to_string(),
            ));
        }
        Ok(data)
    }

    /// Lists the API versions known to the endpoint, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn public_api_versions(&self, url: &str) -> Result<Vec<ApiVersion>> {
        let data = self.query(url, PUBLIC_API_VERSIONS_QUERY).await?;
        let versions = data
            .get("publicApiVersions")
            .cloned()
            .unwrap_or(serde_json::Value::Array(Vec::new()));
        let versions: Vec<ApiVersion> =
            serde_json::from_value(versions).map_err(|e| IntrospectionError::Parse(e.to_string()))?;
        tracing::debug!(count = versions.len(), "Fetched API versions");
        Ok(versions)
    }

    /// Posts a query with retries and returns the response's `data` payload.
    async fn query(&self, url: &str, query: &str) -> Result<serde_json::Value> {
        let mut last_error = None;
        let attempts = self.retries + 1;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1)); // 1s, 2s, 4s, ...
                tracing::info!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            match self.query_once(url, query).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Request failed");
                    let retryable = Self::is_retryable(&e);
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| IntrospectionError::Network("No attempts made".to_string())))
    }

    /// Executes a single request without retry logic.
    async fn query_once(&self, url: &str, query: &str) -> Result<serde_json::Value> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| {
                IntrospectionError::Network(format!("Failed to create HTTP client: {e}"))
            })?;

        let body = serde_json::json!({ "query": query });

        tracing::info!("Sending query");
        let mut request = client.post(url).header("Content-Type", "application/json");
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| IntrospectionError::Network(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Received response");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %error_body, "HTTP error response");
            // The direct proxy reports unknown versions as {"error": "..."} with a 4xx
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&error_body) {
                if let Some(message) = json.get("error").and_then(serde_json::Value::as_str) {
                    return Err(IntrospectionError::Api(message.to_string()));
                }
            }
            return Err(IntrospectionError::Http(status.as_u16(), error_body));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse response");
            IntrospectionError::Parse(e.to_string())
        })?;

        Self::extract_data(json)
    }

    /// Pulls `data` out of a GraphQL response, surfacing `error` / `errors`.
    fn extract_data(mut json: serde_json::Value) -> Result<serde_json::Value> {
        if let Some(error) = json.get("error") {
            let message = error
                .as_str()
                .map_or_else(|| error.to_string(), ToString::to_string);
            return Err(IntrospectionError::Api(message));
        }

        if let Some(errors) = json.get("errors") {
            if errors.as_array().is_some_and(|errors| !errors.is_empty()) {
                return Err(IntrospectionError::GraphQL(errors.to_string()));
            }
        }

        match json.get_mut("data").map(serde_json::Value::take) {
            Some(data) if data.is_object() => Ok(data),
            _ => Err(IntrospectionError::Invalid(
                "response has no data".to_string(),
            )),
        }
    }

    /// Determines if an error is retryable.
    ///
    /// Network errors and 5xx server errors are retryable.
    /// Everything else is an answer from the server and will not change.
    fn is_retryable(error: &IntrospectionError) -> bool {
        match error {
            IntrospectionError::Network(_) => true,
            IntrospectionError::Http(status, _) => *status >= 500,
            IntrospectionError::Parse(_)
            | IntrospectionError::Invalid(_)
            | IntrospectionError::Api(_)
            | IntrospectionError::GraphQL(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_default() {
        let client = IntrospectionClient::new();
        assert!(client.headers.is_empty());
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(client.retries, 0);
    }

    #[test]
    fn test_client_with_headers() {
        let client = IntrospectionClient::new()
            .with_header("X-Shopify-Access-Token", "shpat_123")
            .with_headers(vec![("Content-Type", "application/json")]);

        assert_eq!(client.headers.len(), 2);
        assert_eq!(
            client.headers.get("X-Shopify-Access-Token"),
            Some(&"shpat_123".to_string())
        );
    }

    #[test]
    fn test_client_with_timeout_and_retries() {
        let client = IntrospectionClient::new()
            .with_timeout(Duration::from_secs(60))
            .with_connect_timeout(Duration::from_secs(5))
            .with_retries(3);
        assert_eq!(client.timeout, Duration::from_secs(60));
        assert_eq!(client.connect_timeout, Duration::from_secs(5));
        assert_eq!(client.retries, 3);
    }

    #[test]
    fn test_is_retryable() {
        assert!(IntrospectionClient::is_retryable(
            &IntrospectionError::Network("timeout".into())
        ));
        assert!(IntrospectionClient::is_retryable(
            &IntrospectionError::Http(503, "error".into())
        ));
        assert!(!IntrospectionClient::is_retryable(
            &IntrospectionError::Http(401, "error".into())
        ));
        assert!(!IntrospectionClient::is_retryable(
            &IntrospectionError::Api("Invalid API version".into())
        ));
        assert!(!IntrospectionClient::is_retryable(
            &IntrospectionError::GraphQL("[]".into())
        ));
    }

    #[test]
    fn test_extract_data() {
        let data = IntrospectionClient::extract_data(json!({
            "data": { "__schema": { "types": [] } }
        }))
        .unwrap();
        assert!(data.get("__schema").is_some());
    }

    #[test]
    fn test_extract_data_api_error() {
        let err = IntrospectionClient::extract_data(json!({ "error": "Invalid API version" }))
            .unwrap_err();
        assert!(err.is_invalid_version());
    }

    #[test]
    fn test_extract_data_graphql_errors() {
        let err = IntrospectionClient::extract_data(json!({
            "errors": [{ "message": "Access denied" }]
        }))
        .unwrap_err();
        assert!(matches!(err, IntrospectionError::GraphQL(ref m) if m.contains("Access denied")));
    }

    #[test]
    fn test_extract_data_missing() {
        let err = IntrospectionClient::extract_data(json!({})).unwrap_err();
        assert!(matches!(err, IntrospectionError::Invalid(_)));
    }
}
