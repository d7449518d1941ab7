//! Query document model.
//!
//! Only what schema resolution needs is kept: names, type conditions,
//! argument literals and positions. Directives are dropped and aliases are
//! recorded but never affect resolution.

use query_analyzer_types::{OperationKind, Origin};
use std::collections::HashMap;
use std::sync::Arc;

/// A parsed query document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument {
    /// Operations in document order
    pub operations: Vec<OperationNode>,
    fragments: Vec<FragmentDefinition>,
    fragment_index: HashMap<Arc<str>, usize>,
}

impl QueryDocument {
    pub(crate) fn new(operations: Vec<OperationNode>, fragments: Vec<FragmentDefinition>) -> Self {
        let fragment_index = fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| (Arc::clone(&fragment.name), i))
            .collect();
        Self {
            operations,
            fragments,
            fragment_index,
        }
    }

    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragment_index.get(name).map(|&i| &self.fragments[i])
    }

    /// Fragment definitions in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.fragments.iter()
    }

    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNode {
    pub name: Option<Arc<str>>,
    pub kind: OperationKind,
    pub variables: Vec<VariableDefinition>,
    pub selections: Vec<Selection>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: Arc<str>,
    /// Declared type with wrappers stripped
    pub type_name: Arc<str>,
    pub default_value: Option<Value>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDefinition {
    pub name: Arc<str>,
    pub type_condition: Arc<str>,
    pub selections: Vec<Selection>,
    pub origin: Origin,
}

/// One entry of a selection set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl Selection {
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        match self {
            Self::Field(field) => &field.origin,
            Self::FragmentSpread(spread) => &spread.origin,
            Self::InlineFragment(inline) => &inline.origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: Arc<str>,
    pub alias: Option<Arc<str>>,
    pub arguments: Vec<Argument>,
    pub selections: Vec<Selection>,
    /// Position of the field name
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpread {
    pub name: Arc<str>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFragment {
    /// `None` for `... { }` without `on Type`
    pub type_condition: Option<Arc<str>>,
    pub selections: Vec<Selection>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Arc<str>,
    pub value: Value,
    pub origin: Origin,
}

/// An input literal.
///
/// Numbers are kept as written since they are never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Variable(Arc<str>),
    Int(String),
    Float(String),
    String(String),
    Boolean(bool),
    Null,
    Enum { value: Arc<str>, origin: Origin },
    List(Vec<Value>),
    Object(Vec<ObjectField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectField {
    pub name: Arc<str>,
    pub value: Value,
}
