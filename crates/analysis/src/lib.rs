//! Schema resolution and version diffing.
//!
//! [`resolve`] walks a parsed query against one [`SchemaModel`] and
//! classifies every field, argument and enum value it references. [`diff`]
//! does this against a current and a target schema and merges the two runs
//! into one finding per reference; [`Analyzer`] adds parsing and turns
//! per-query failures into findings, and [`BatchAnalyzer`] runs many
//! queries on a worker pool.
//!
//! [`SchemaModel`]: query_analyzer_schema::SchemaModel

mod batch;
mod differ;
mod error;
mod finding;
mod report;
mod resolver;

pub use batch::BatchAnalyzer;
pub use differ::{diff, Analyzer};
pub use error::ResolveError;
pub use finding::{Finding, FindingKind};
pub use report::{DiffCategory, DiffFinding, QueryReport, Report, Summary, Versions};
pub use resolver::resolve;
