//! GraphQL introspection for the query upgrade analyzer.
//!
//! This crate knows the wire shape of an introspection result and how to
//! ask an endpoint for one. It does not interpret the schema; that is the
//! job of `query-analyzer-schema`.
//!
//! # Example
//!
//! ```no_run
//! use query_analyzer_introspect::IntrospectionClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IntrospectionClient::new()
//!         .with_header("X-Shopify-Access-Token", "shpat_...")
//!         .with_timeout(Duration::from_secs(60))
//!         .with_retries(3);
//!
//!     let json = client
//!         .execute_raw("https://myshop.myshopify.com/admin/api/2025-01/graphql.json")
//!         .await?;
//!     println!("{json}");
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod query;
mod types;

pub use client::IntrospectionClient;
pub use error::{IntrospectionError, Result};
pub use query::{INTROSPECTION_QUERY, PUBLIC_API_VERSIONS_QUERY};
pub use types::*;
