//! Typed GraphQL schema model.
//!
//! Introspection JSON is converted once, at load time, into a [`SchemaModel`]:
//! a flat table of [`TypeDef`]s keyed by name. Types refer to each other by
//! name only, so the cyclic type graph needs no shared ownership, and a model
//! can be shared read-only across threads.
//!
//! ```
//! use query_analyzer_schema::SchemaModel;
//!
//! let json = r#"{"__schema": {
//!     "queryType": {"name": "Query"},
//!     "types": [{
//!         "kind": "OBJECT",
//!         "name": "Query",
//!         "fields": [{
//!             "name": "shop",
//!             "args": [],
//!             "type": {"kind": "SCALAR", "name": "String", "ofType": null},
//!             "isDeprecated": false,
//!             "deprecationReason": null
//!         }],
//!         "interfaces": []
//!     }]
//! }}"#;
//!
//! let schema = SchemaModel::from_json_str(json).unwrap();
//! assert!(schema.get("Query").unwrap().field("shop").is_some());
//! ```

mod builder;
mod error;
mod model;

pub use builder::{build_schema, BUILTIN_SCALARS, DEFAULT_DEPRECATION_REASON};
pub use error::{Result, SchemaLoadError};
pub use model::{
    Deprecation, EnumValueDef, FieldDef, InputValueDef, SchemaModel, TypeDef, TypeDefKind,
    TypeRef,
};
