//! Configuration for the query upgrade analyzer.
//!
//! Holds the API selection, the credentials used to reach the schema
//! endpoints, and the optional project config file that provides defaults
//! for the command line.

mod config;
mod error;
mod loader;

pub use config::{
    AnalyzerConfig, ApiKind, AuthConfig, OutputFormat, ADMIN_TOKEN_ENV, DEFAULT_CACHE_DIR,
    STOREFRONT_TOKEN_ENV,
};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILES};
