//! # Query Extraction
//!
//! Finds GraphQL query documents in source files and records where each one
//! starts, so findings can be reported against the host file.
//!
//! - `.graphql` / `.gql` files are one document each.
//! - `.php` files contribute every heredoc or nowdoc delimited by `QUERY`,
//!   `GRAPHQL` or `GQL`.
//!
//! [`QueryCollector`] walks files and directories and dispatches each file
//! to the [`Extractor`] registered for its extension.

mod collector;
mod error;
mod extractor;
mod graphql;
mod php;
mod query;

pub use collector::QueryCollector;
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use graphql::GraphqlExtractor;
pub use php::PhpExtractor;
pub use query::ExtractedQuery;
