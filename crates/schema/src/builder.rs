//! Introspection JSON → [`SchemaModel`].

use crate::model::{
    Deprecation, EnumValueDef, FieldDef, InputValueDef, SchemaModel, TypeDef, TypeDefKind,
    TypeRef,
};
use crate::{Result, SchemaLoadError};
use query_analyzer_introspect::{
    IntrospectionField, IntrospectionInputValue, IntrospectionSchema, IntrospectionType,
    IntrospectionTypeRef,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Scalars every GraphQL schema has, added when an introspection result omits them.
pub const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// Reason used for a deprecated element that carries none.
pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Build a schema model from an introspection result.
///
/// Accepts `{"__schema": ...}` as well as `{"data": {"__schema": ...}}`.
/// Every type reference (field types, argument types, input field types,
/// interfaces, union members, root types) must name a declared type; the
/// first violation in document order is returned and no model is produced.
#[tracing::instrument(skip(value))]
pub fn build_schema(value: &serde_json::Value) -> Result<SchemaModel> {
    let schema_value = IntrospectionSchema::locate(value).ok_or(SchemaLoadError::MissingSchema)?;
    let schema = IntrospectionSchema::deserialize(schema_value)
        .map_err(|e| SchemaLoadError::Json(e.to_string()))?;

    let mut declared: HashSet<&str> = HashSet::with_capacity(schema.types.len());
    for (index, ty) in schema.types.iter().enumerate() {
        let name = ty.name.as_deref().ok_or(SchemaLoadError::MissingName(index))?;
        if !declared.insert(name) {
            return Err(SchemaLoadError::DuplicateType(name.to_string()));
        }
    }
    let missing_builtins: Vec<&str> = BUILTIN_SCALARS
        .iter()
        .copied()
        .filter(|scalar| !declared.contains(scalar))
        .collect();
    declared.extend(missing_builtins.iter().copied());

    let builder = Builder {
        declared: &declared,
    };

    let mut types = HashMap::with_capacity(declared.len());
    for ty in &schema.types {
        let def = builder.type_def(ty)?;
        types.insert(Arc::clone(&def.name), def);
    }
    for scalar in missing_builtins {
        types.insert(Arc::from(scalar), TypeDef::new(scalar, TypeDefKind::Scalar));
    }

    let query_type = builder.root("queryType", schema.query_type.as_ref().map(|r| &*r.name))?;
    let mutation_type =
        builder.root("mutationType", schema.mutation_type.as_ref().map(|r| &*r.name))?;
    let subscription_type = builder.root(
        "subscriptionType",
        schema.subscription_type.as_ref().map(|r| &*r.name),
    )?;

    tracing::debug!(types = types.len(), "Built schema model");

    Ok(SchemaModel {
        query_type,
        mutation_type,
        subscription_type,
        types,
    })
}

struct Builder<'a> {
    declared: &'a HashSet<&'a str>,
}

impl Builder<'_> {
    fn type_def(&self, ty: &IntrospectionType) -> Result<TypeDef> {
        // Names were checked while collecting `declared`
        let name = ty.name.as_deref().unwrap_or_default();
        let kind = TypeDefKind::from_introspection(&ty.kind).ok_or_else(|| {
            SchemaLoadError::UnknownKind {
                type_name: name.to_string(),
                kind: ty.kind.clone(),
            }
        })?;

        let mut def = TypeDef::new(name, kind);
        match kind {
            TypeDefKind::Object | TypeDefKind::Interface => {
                for field in &ty.fields {
                    let field = self.field(name, field)?;
                    def.fields.insert(Arc::clone(&field.name), field);
                }
                def.implements = self.named_refs(name, &ty.interfaces)?;
            }
            TypeDefKind::Union => {
                def.union_members = self.named_refs(name, &ty.possible_types)?;
            }
            TypeDefKind::Enum => {
                for value in &ty.enum_values {
                    let value = EnumValueDef {
                        name: Arc::from(value.name.as_str()),
                        deprecation: deprecation(value.is_deprecated, value.deprecation_reason.as_deref()),
                    };
                    def.enum_values.insert(Arc::clone(&value.name), value);
                }
            }
            TypeDefKind::InputObject => {
                for input in &ty.input_fields {
                    let input = self.input_value(&format!("{name}.{}", input.name), input)?;
                    def.input_fields.insert(Arc::clone(&input.name), input);
                }
            }
            TypeDefKind::Scalar => {}
        }
        Ok(def)
    }

    fn field(&self, owner: &str, field: &IntrospectionField) -> Result<FieldDef> {
        let path = format!("{owner}.{}", field.name);
        let mut arguments = HashMap::with_capacity(field.args.len());
        for arg in &field.args {
            let arg = self.input_value(&format!("{path}({})", arg.name), arg)?;
            arguments.insert(Arc::clone(&arg.name), arg);
        }
        Ok(FieldDef {
            name: Arc::from(field.name.as_str()),
            type_ref: self.type_ref(&path, &field.type_ref)?,
            arguments,
            deprecation: deprecation(field.is_deprecated, field.deprecation_reason.as_deref()),
        })
    }

    fn input_value(&self, path: &str, value: &IntrospectionInputValue) -> Result<InputValueDef> {
        Ok(InputValueDef {
            name: Arc::from(value.name.as_str()),
            type_ref: self.type_ref(path, &value.type_ref)?,
            default_value: value.default_value.as_deref().map(Arc::from),
            deprecation: deprecation(value.is_deprecated, value.deprecation_reason.as_deref()),
        })
    }

    fn type_ref(&self, path: &str, type_ref: &IntrospectionTypeRef) -> Result<TypeRef> {
        let invalid = || SchemaLoadError::InvalidTypeRef {
            referenced_by: path.to_string(),
        };
        match type_ref.kind.as_str() {
            "LIST" => {
                let inner = type_ref.of_type.as_deref().ok_or_else(invalid)?;
                Ok(TypeRef::List(Box::new(self.type_ref(path, inner)?)))
            }
            "NON_NULL" => {
                let inner = type_ref.of_type.as_deref().ok_or_else(invalid)?;
                Ok(TypeRef::NonNull(Box::new(self.type_ref(path, inner)?)))
            }
            _ => {
                let name = type_ref.name.as_deref().ok_or_else(invalid)?;
                Ok(TypeRef::Named(self.declared_name(path, name)?))
            }
        }
    }

    fn named_refs(&self, owner: &str, refs: &[IntrospectionTypeRef]) -> Result<Vec<Arc<str>>> {
        refs.iter()
            .map(|r| {
                let name = r.name.as_deref().ok_or_else(|| SchemaLoadError::InvalidTypeRef {
                    referenced_by: owner.to_string(),
                })?;
                self.declared_name(owner, name)
            })
            .collect()
    }

    fn root(&self, path: &str, name: Option<&str>) -> Result<Option<Arc<str>>> {
        name.map(|name| self.declared_name(path, name)).transpose()
    }

    fn declared_name(&self, referenced_by: &str, name: &str) -> Result<Arc<str>> {
        if self.declared.contains(name) {
            Ok(Arc::from(name))
        } else {
            Err(SchemaLoadError::UndeclaredType {
                referenced_by: referenced_by.to_string(),
                type_name: name.to_string(),
            })
        }
    }
}

fn deprecation(is_deprecated: bool, reason: Option<&str>) -> Option<Deprecation> {
    is_deprecated.then(|| Deprecation {
        reason: Arc::from(reason.unwrap_or(DEFAULT_DEPRECATION_REASON)),
    })
}
