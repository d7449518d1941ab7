use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Default location of the on-disk schema cache.
pub const DEFAULT_CACHE_DIR: &str = ".cache/shopify-schema";

/// Environment variable holding the Admin API access token.
pub const ADMIN_TOKEN_ENV: &str = "SHOPIFY_ADMIN_TOKEN";

/// Environment variable holding the Storefront API access token.
pub const STOREFRONT_TOKEN_ENV: &str = "SHOPIFY_STOREFRONT_TOKEN";

/// Which of the vendor's GraphQL APIs a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    #[default]
    Admin,
    Storefront,
}

impl ApiKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Storefront => "storefront",
        }
    }

    /// Capitalized name for human output ("Admin", "Storefront").
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Storefront => "Storefront",
        }
    }
}

impl std::fmt::Display for ApiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "storefront" => Ok(Self::Storefront),
            _ => Err(ConfigError::UnknownApi(s.to_string())),
        }
    }
}

/// How reports are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Credentials and routing for the schema endpoints.
///
/// Two modes are supported: the public direct proxy, which needs no
/// credentials but only serves recent versions, and a shop endpoint
/// authenticated with an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthConfig {
    /// Shop domain, with or without the `.myshopify.com` suffix
    pub shop: Option<String>,
    /// Admin API access token
    pub admin_token: Option<String>,
    /// Storefront API access token
    pub storefront_token: Option<String>,
    /// Use the unauthenticated direct proxy instead of a shop
    pub use_direct_proxy: bool,
}

impl AuthConfig {
    /// Direct proxy configuration.
    #[must_use]
    pub fn direct_proxy() -> Self {
        Self {
            use_direct_proxy: true,
            ..Self::default()
        }
    }

    /// Fill missing tokens from `SHOPIFY_ADMIN_TOKEN` / `SHOPIFY_STOREFRONT_TOKEN`.
    #[must_use]
    pub fn with_env_tokens(self) -> Self {
        self.with_tokens_from(|key| std::env::var(key).ok())
    }

    /// Fill missing tokens using the given lookup.
    #[must_use]
    pub fn with_tokens_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.admin_token.is_none() {
            self.admin_token = lookup(ADMIN_TOKEN_ENV).filter(|t| !t.is_empty());
        }
        if self.storefront_token.is_none() {
            self.storefront_token = lookup(STOREFRONT_TOKEN_ENV).filter(|t| !t.is_empty());
        }
        self
    }

    /// GraphQL endpoint for the given API and version.
    pub fn endpoint(&self, api: ApiKind, version: &str) -> Result<String> {
        if self.use_direct_proxy {
            return Ok(match api {
                ApiKind::Admin => {
                    format!("https://shopify.dev/admin-graphql-direct-proxy/{version}")
                }
                ApiKind::Storefront => {
                    format!("https://shopify.dev/storefront-graphql-direct-proxy/{version}")
                }
            });
        }

        let shop = self.shop_domain()?;
        Ok(match api {
            ApiKind::Admin => format!("https://{shop}/admin/api/{version}/graphql.json"),
            ApiKind::Storefront => format!("https://{shop}/api/{version}/graphql.json"),
        })
    }

    /// Request headers for the given API, including the access token header.
    pub fn headers(&self, api: ApiKind) -> Result<BTreeMap<String, String>> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        if self.use_direct_proxy {
            return Ok(headers);
        }

        let (name, token) = match api {
            ApiKind::Admin => ("X-Shopify-Access-Token", self.admin_token.as_deref()),
            ApiKind::Storefront => (
                "X-Shopify-Storefront-Access-Token",
                self.storefront_token.as_deref(),
            ),
        };
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken(api))?;
        headers.insert(name.to_string(), token.to_string());

        Ok(headers)
    }

    /// Check that endpoint and headers can be produced for `api`.
    pub fn validate(&self, api: ApiKind) -> Result<()> {
        if !self.use_direct_proxy {
            self.shop_domain()?;
        }
        self.headers(api).map(|_| ())
    }

    fn shop_domain(&self) -> Result<String> {
        let shop = self
            .shop
            .as_deref()
            .map(|s| s.trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingShop)?;

        if shop.ends_with(".myshopify.com") {
            Ok(shop.to_string())
        } else {
            Ok(format!("{shop}.myshopify.com"))
        }
    }
}

/// Settings for one analysis run.
///
/// Every field has a default so the same type can be read from a partial
/// project config file and then overridden from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Files or directories to scan
    pub paths: Vec<PathBuf>,
    pub api: ApiKind,
    /// Version the code is written against; resolved to the latest when absent
    pub current_version: Option<String>,
    /// Version to compare against: `latest`, `unstable` or an explicit handle
    pub target: String,
    pub auth: AuthConfig,
    pub output_format: OutputFormat,
    /// Extension filter (`.php`, `graphql`, ...)
    pub extensions: Option<Vec<String>>,
    pub cache_dir: PathBuf,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            api: ApiKind::default(),
            current_version: None,
            target: "latest".to_string(),
            auth: AuthConfig::default(),
            output_format: OutputFormat::default(),
            extensions: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl AnalyzerConfig {
    /// Extension filter normalized to lowercase with a leading dot.
    #[must_use]
    pub fn normalized_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_ref().map(|exts| {
            exts.iter()
                .map(|ext| {
                    let ext = ext.to_ascii_lowercase();
                    if ext.starts_with('.') {
                        ext
                    } else {
                        format!(".{ext}")
                    }
                })
                .collect()
        })
    }
}
