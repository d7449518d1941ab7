//! Foundation types for the query analyzer.
//!
//! This crate has no dependencies and is shared by every other crate in the
//! workspace:
//!
//! - **Location types**: [`Origin`], [`LineColumn`]
//! - **Classification types**: [`Severity`], [`OperationKind`]

mod operation;
mod origin;
mod severity;

pub use operation::OperationKind;
pub use origin::{LineColumn, Origin};
pub use severity::Severity;
