//! Schema acquisition for the analyzer.
//!
//! [`SchemaCache`] hands out one shared [`SchemaModel`] per `(api, version)`.
//! Bytes come from a [`SchemaFetcher`]: [`HttpFetcher`] introspects the live
//! API, [`FileFetcher`] reads local files. An optional [`SchemaStore`] keeps
//! the raw introspection JSON on disk between runs.
//!
//! [`SchemaModel`]: query_analyzer_schema::SchemaModel

mod error;
mod fetcher;
mod manager;
mod store;

pub use error::{CacheError, Result};
pub use fetcher::{FileFetcher, HttpFetcher, SchemaFetcher};
pub use manager::SchemaCache;
pub use store::{CacheEntry, CacheMetadata, SchemaStore};
