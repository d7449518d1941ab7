use crate::ApiKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid API type '{0}'. Use 'admin' or 'storefront'.")]
    UnknownApi(String),

    #[error("Invalid format '{0}'. Use 'human' or 'json'.")]
    UnknownFormat(String),

    #[error("Shop domain is required when not using the direct proxy")]
    MissingShop,

    #[error("{} token is required for the {} API", .0.title(), .0.title())]
    MissingToken(ApiKind),
}
