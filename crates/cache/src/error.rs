use query_analyzer_schema::SchemaLoadError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Failure to obtain a schema.
///
/// Cloneable because one failed fetch is handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("failed to fetch schema: {0}")]
    Fetch(String),

    #[error(transparent)]
    SchemaLoad(#[from] SchemaLoadError),

    #[error("schema cache I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
