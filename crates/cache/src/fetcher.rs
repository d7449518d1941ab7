use crate::{CacheError, Result};
use query_analyzer_config::{ApiKind, AuthConfig};
use query_analyzer_introspect::{ApiVersion, IntrospectionClient, IntrospectionError};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

/// Where schema bytes come from.
///
/// Implementations only move bytes; parsing and caching happen in
/// [`SchemaCache`](crate::SchemaCache).
pub trait SchemaFetcher: Send + Sync + 'static {
    /// Raw introspection JSON for `(api, version)`.
    fn fetch(&self, api: ApiKind, version: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Versions the source knows about, newest first.
    fn available_versions(
        &self,
        api: ApiKind,
    ) -> impl Future<Output = Result<Vec<ApiVersion>>> + Send {
        let _ = api;
        async { Ok(Vec::new()) }
    }
}

/// Version used to ask the endpoint which versions exist.
const DIRECT_PROXY_QUERY_VERSION: &str = "2025-01";
const SHOP_QUERY_VERSION: &str = "2024-10";

/// Fetches schemas by introspecting the live API.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    auth: AuthConfig,
    client: IntrospectionClient,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            client: IntrospectionClient::new().with_retries(2),
        }
    }

    /// Use a preconfigured client (timeouts, retries, extra headers).
    #[must_use]
    pub fn with_client(mut self, client: IntrospectionClient) -> Self {
        self.client = client;
        self
    }

    fn client_for(&self, api: ApiKind, version: &str) -> Result<(String, IntrospectionClient)> {
        let config_error = |e: query_analyzer_config::ConfigError| CacheError::Fetch(e.to_string());
        let endpoint = self.auth.endpoint(api, version).map_err(config_error)?;
        let headers = self.auth.headers(api).map_err(config_error)?;
        Ok((endpoint, self.client.clone().with_headers(headers)))
    }

    fn fetch_error(&self, version: &str, err: &IntrospectionError) -> CacheError {
        if !err.is_invalid_version() {
            return CacheError::Fetch(err.to_string());
        }
        if self.auth.use_direct_proxy {
            CacheError::Fetch(format!(
                "API version '{version}' is not supported by the direct proxy. \
                 The direct proxy only supports recent versions (2025-01 and newer). \
                 Try using --current-version 2025-01 --target 2025-04, \
                 or use shop credentials instead of --use-direct-proxy."
            ))
        } else {
            CacheError::Fetch(format!("Invalid API version: {version}"))
        }
    }
}

impl SchemaFetcher for HttpFetcher {
    #[tracing::instrument(skip(self), fields(direct_proxy = self.auth.use_direct_proxy))]
    async fn fetch(&self, api: ApiKind, version: &str) -> Result<Vec<u8>> {
        let (endpoint, client) = self.client_for(api, version)?;
        let data = client
            .execute_raw(&endpoint)
            .await
            .map_err(|e| self.fetch_error(version, &e))?;
        serde_json::to_vec(&data).map_err(|e| CacheError::Fetch(e.to_string()))
    }

    #[tracing::instrument(skip(self))]
    async fn available_versions(&self, api: ApiKind) -> Result<Vec<ApiVersion>> {
        let query_version = if self.auth.use_direct_proxy {
            DIRECT_PROXY_QUERY_VERSION
        } else {
            SHOP_QUERY_VERSION
        };
        let (endpoint, client) = self.client_for(api, query_version)?;
        client
            .public_api_versions(&endpoint)
            .await
            .map_err(|e| CacheError::Fetch(e.to_string()))
    }
}

/// Reads introspection JSON from local files, one per version label.
///
/// Used for offline analysis against pre-downloaded schemas.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    files: HashMap<String, PathBuf>,
}

impl FileFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, version: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(version.into(), path.into());
        self
    }
}

impl SchemaFetcher for FileFetcher {
    async fn fetch(&self, _api: ApiKind, version: &str) -> Result<Vec<u8>> {
        let path = self
            .files
            .get(version)
            .ok_or_else(|| CacheError::Fetch(format!("no schema file for version {version}")))?;
        tracing::debug!(path = %path.display(), "Reading schema file");
        std::fs::read(path)
            .map_err(|e| CacheError::Fetch(format!("cannot read {}: {e}", path.display())))
    }
}
