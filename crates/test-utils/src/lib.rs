//! # Query Analyzer Test Utilities
//!
//! Shared test infrastructure for the analyzer crates. Schemas in tests are
//! written as SDL and converted to the introspection JSON the analyzer
//! consumes in production, so a test reads like the schema it exercises.
//!
//! ```
//! use query_analyzer_test_utils::sdl_to_introspection;
//!
//! let json = sdl_to_introspection(r#"
//!     type Query { order: Order }
//!     type Order { name: String @deprecated(reason: "Use title") }
//! "#);
//! assert_eq!(json["__schema"]["queryType"]["name"], "Query");
//! ```

// Test utilities are less strict than production code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_raw_string_hashes)]
#![allow(clippy::doc_markdown)]

pub mod fixtures;
mod introspection;

pub use introspection::{sdl_to_introspection, sdl_to_introspection_string};
