//! # GraphQL Query Parsing
//!
//! Turns the text of one GraphQL query document into a [`QueryDocument`]:
//! operations, selections and fragment definitions, each annotated with an
//! [`Origin`](query_analyzer_types::Origin) in the *host* file.
//!
//! Queries are usually embedded in other files. A [`QuerySource`] records
//! where the text starts, so a selection on the third line of a query
//! embedded at line 40 is reported at line 42.
//!
//! ```
//! use query_analyzer_syntax::{parse, QuerySource, Selection};
//!
//! let source = QuerySource::new("query { shop { name } }", "app/Shop.php").at(12, 1);
//! let document = parse(&source).unwrap();
//!
//! let Selection::Field(shop) = &document.operations[0].selections[0] else {
//!     unreachable!()
//! };
//! assert_eq!(shop.name.as_ref(), "shop");
//! assert_eq!(shop.origin.line, 12);
//! ```

mod ast;
mod error;
mod line_index;
mod parser;
mod source;

pub use ast::{
    Argument, FieldSelection, FragmentDefinition, FragmentSpread, InlineFragment, ObjectField,
    OperationNode, QueryDocument, Selection, Value, VariableDefinition,
};
pub use error::{ParseError, Result};
pub use line_index::LineIndex;
pub use parser::parse;
pub use source::QuerySource;
