use query_analyzer_types::OperationKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Kind of a named schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDefKind {
    Object,
    Interface,
    Union,
    Enum,
    Scalar,
    InputObject,
}

impl TypeDefKind {
    /// Parse an introspection `kind` string. Wrapper kinds are not type kinds.
    #[must_use]
    pub fn from_introspection(kind: &str) -> Option<Self> {
        match kind {
            "OBJECT" => Some(Self::Object),
            "INTERFACE" => Some(Self::Interface),
            "UNION" => Some(Self::Union),
            "ENUM" => Some(Self::Enum),
            "SCALAR" => Some(Self::Scalar),
            "INPUT_OBJECT" => Some(Self::InputObject),
            _ => None,
        }
    }

    /// Object, interface or union: something fields can be selected on.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::Union)
    }

    /// Scalar or enum.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::Scalar => "scalar",
            Self::InputObject => "input object",
        }
    }
}

/// Reference to a type, with list/non-null wrappers nested arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(Arc<str>),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// The named type with every wrapper stripped.
    #[must_use]
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => &**name,
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
        }
    }

    /// The reference with one level of non-null stripped.
    #[must_use]
    pub fn nullable(&self) -> &Self {
        match self {
            Self::NonNull(inner) => inner.as_ref(),
            other => other,
        }
    }

    /// The element type if this is a (possibly non-null) list.
    #[must_use]
    pub fn list_item(&self) -> Option<&Self> {
        match self.nullable() {
            Self::List(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_wrapped(&self) -> bool {
        !matches!(self, Self::Named(_))
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// Deprecation marker. Its presence means the element is deprecated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Deprecation {
    /// Free text; may name the replacement or the version of removal
    pub reason: Arc<str>,
}

/// Field argument or input object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueDef {
    pub name: Arc<str>,
    pub type_ref: TypeRef,
    /// Default literal as printed by introspection
    pub default_value: Option<Arc<str>>,
    pub deprecation: Option<Deprecation>,
}

impl InputValueDef {
    /// Non-null without a default, so callers must pass it.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self.type_ref, TypeRef::NonNull(_)) && self.default_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub type_ref: TypeRef,
    pub arguments: HashMap<Arc<str>, InputValueDef>,
    pub deprecation: Option<Deprecation>,
}

impl FieldDef {
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&InputValueDef> {
        self.arguments.get(name)
    }

    /// Arguments that must be passed, sorted by name.
    #[must_use]
    pub fn required_arguments(&self) -> Vec<&InputValueDef> {
        let mut required: Vec<_> = self.arguments.values().filter(|a| a.is_required()).collect();
        required.sort_by(|a, b| a.name.cmp(&b.name));
        required
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDef {
    pub name: Arc<str>,
    pub deprecation: Option<Deprecation>,
}

/// A named type of the schema.
///
/// Which collections are populated depends on `kind`: fields for objects and
/// interfaces, `implements` for objects and interfaces, `union_members` for
/// unions, `enum_values` for enums and `input_fields` for input objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: Arc<str>,
    pub kind: TypeDefKind,
    pub fields: HashMap<Arc<str>, FieldDef>,
    pub input_fields: HashMap<Arc<str>, InputValueDef>,
    pub implements: Vec<Arc<str>>,
    pub union_members: Vec<Arc<str>>,
    pub enum_values: HashMap<Arc<str>, EnumValueDef>,
}

impl TypeDef {
    /// Type with no members of the given kind.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, kind: TypeDefKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: HashMap::new(),
            input_fields: HashMap::new(),
            implements: Vec::new(),
            union_members: Vec::new(),
            enum_values: HashMap::new(),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn input_field(&self, name: &str) -> Option<&InputValueDef> {
        self.input_fields.get(name)
    }

    #[must_use]
    pub fn enum_value(&self, name: &str) -> Option<&EnumValueDef> {
        self.enum_values.get(name)
    }

    #[must_use]
    pub fn implements(&self, interface: &str) -> bool {
        self.implements.iter().any(|name| &**name == interface)
    }
}

/// An immutable, indexed schema for one (api, version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModel {
    pub(crate) query_type: Option<Arc<str>>,
    pub(crate) mutation_type: Option<Arc<str>>,
    pub(crate) subscription_type: Option<Arc<str>>,
    pub(crate) types: HashMap<Arc<str>, TypeDef>,
}

impl SchemaModel {
    /// Parse and build a model from introspection JSON text.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| crate::SchemaLoadError::Json(e.to_string()))?;
        crate::build_schema(&value)
    }

    /// Parse and build a model from introspection JSON bytes.
    pub fn from_json_slice(json: &[u8]) -> crate::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(json)
            .map_err(|e| crate::SchemaLoadError::Json(e.to_string()))?;
        crate::build_schema(&value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Name of the root type serving `kind`, if the schema declares one.
    #[must_use]
    pub fn root_type_name(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// The root type serving `kind`, if the schema declares one.
    #[must_use]
    pub fn root_type(&self, kind: OperationKind) -> Option<&TypeDef> {
        self.root_type_name(kind).and_then(|name| self.get(name))
    }

    /// Number of named types, built-ins included.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Concrete object types a value of type `name` can have at runtime.
    ///
    /// An object is its own only possible type, an interface has all its
    /// implementing objects and a union has its members. The result is sorted.
    #[must_use]
    pub fn possible_types(&self, name: &str) -> Vec<&str> {
        let Some(ty) = self.get(name) else {
            return Vec::new();
        };

        let mut result: Vec<&str> = match ty.kind {
            TypeDefKind::Object => vec![&*ty.name],
            TypeDefKind::Union => ty
                .union_members
                .iter()
                .map(|member| &**member)
                .filter(|member| self.get(member).is_some())
                .collect(),
            TypeDefKind::Interface => self
                .types
                .values()
                .filter(|candidate| {
                    candidate.kind == TypeDefKind::Object && candidate.implements(name)
                })
                .map(|candidate| &*candidate.name)
                .collect(),
            _ => Vec::new(),
        };
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Does every value of type `type_name` also satisfy fragment condition `condition`?
    ///
    /// True when the names match, when `type_name` implements the interface
    /// `condition`, or when `type_name` is a member of the union `condition`.
    #[must_use]
    pub fn satisfies(&self, type_name: &str, condition: &str) -> bool {
        if type_name == condition {
            return true;
        }
        let (Some(ty), Some(cond)) = (self.get(type_name), self.get(condition)) else {
            return false;
        };
        match cond.kind {
            TypeDefKind::Interface => ty.implements(condition),
            TypeDefKind::Union => cond.union_members.iter().any(|m| &**m == type_name),
            _ => false,
        }
    }

    /// Can a value of type `a` also be of type `b`? (non-empty possible type overlap)
    #[must_use]
    pub fn overlaps(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let b_types = self.possible_types(b);
        self.possible_types(a)
            .iter()
            .any(|ty| b_types.binary_search(ty).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> TypeRef {
        TypeRef::Named(name.into())
    }

    #[test]
    fn test_type_ref_display_and_named_type() {
        let ty = TypeRef::NonNull(Box::new(TypeRef::List(Box::new(TypeRef::NonNull(
            Box::new(named("Order")),
        )))));
        assert_eq!(ty.to_string(), "[Order!]!");
        assert_eq!(ty.named_type(), "Order");
        assert!(ty.is_wrapped());
        assert_eq!(ty.list_item().map(ToString::to_string), Some("Order!".into()));
    }

    #[test]
    fn test_type_ref_named_is_not_list() {
        assert!(named("String").list_item().is_none());
        assert!(!named("String").is_wrapped());
    }

    #[test]
    fn test_kind_from_introspection() {
        assert_eq!(
            TypeDefKind::from_introspection("INPUT_OBJECT"),
            Some(TypeDefKind::InputObject)
        );
        assert_eq!(TypeDefKind::from_introspection("LIST"), None);
        assert!(TypeDefKind::Union.is_composite());
        assert!(TypeDefKind::Enum.is_leaf());
        assert!(!TypeDefKind::InputObject.is_composite());
    }
}
