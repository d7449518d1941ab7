use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaLoadError>;

/// Why an introspection result could not be turned into a schema model.
///
/// Building is all-or-nothing: any of these aborts the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaLoadError {
    #[error("introspection result has no __schema")]
    MissingSchema,

    #[error("invalid introspection JSON: {0}")]
    Json(String),

    #[error("type {type_name} has unknown kind {kind}")]
    UnknownKind { type_name: String, kind: String },

    #[error("{referenced_by} references undeclared type {type_name}")]
    UndeclaredType {
        referenced_by: String,
        type_name: String,
    },

    #[error("type at index {0} has no name")]
    MissingName(usize),

    #[error("{referenced_by} has a malformed type reference")]
    InvalidTypeRef { referenced_by: String },

    #[error("type {0} is declared more than once")]
    DuplicateType(String),
}
