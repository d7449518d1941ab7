//! SDL → introspection JSON.
//!
//! Only what the analyzer reads is produced: kinds, names, fields with
//! arguments and types, input fields, interfaces, union members, enum values,
//! root types and `@deprecated` on fields, arguments, input fields and enum
//! values. A type referenced but not defined is emitted with kind `OBJECT` so
//! malformed-schema tests can be written in SDL too.

use apollo_parser::cst::{self, CstNode};
use apollo_parser::Parser;
use serde_json::{json, Value};
use std::collections::HashMap;

const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// Convert SDL into `{"__schema": {...}}`.
///
/// Root types come from a `schema { ... }` definition when present, otherwise
/// from types named `Query`, `Mutation` and `Subscription`.
///
/// Panics if the SDL does not parse; fixtures are expected to be valid.
pub fn sdl_to_introspection(sdl: &str) -> Value {
    let tree = Parser::new(sdl).parse();
    let errors: Vec<String> = tree.errors().map(|e| e.message().to_string()).collect();
    assert!(errors.is_empty(), "invalid fixture SDL: {errors:?}");

    let document = tree.document();
    let mut kinds: HashMap<String, &'static str> = BUILTIN_SCALARS
        .iter()
        .map(|s| ((*s).to_string(), "SCALAR"))
        .collect();
    let mut roots: HashMap<&'static str, String> = HashMap::new();

    for definition in document.definitions() {
        let (name, kind) = match &definition {
            cst::Definition::ObjectTypeDefinition(d) => (d.name(), "OBJECT"),
            cst::Definition::InterfaceTypeDefinition(d) => (d.name(), "INTERFACE"),
            cst::Definition::UnionTypeDefinition(d) => (d.name(), "UNION"),
            cst::Definition::EnumTypeDefinition(d) => (d.name(), "ENUM"),
            cst::Definition::ScalarTypeDefinition(d) => (d.name(), "SCALAR"),
            cst::Definition::InputObjectTypeDefinition(d) => (d.name(), "INPUT_OBJECT"),
            cst::Definition::SchemaDefinition(schema) => {
                for root in schema.root_operation_type_definitions() {
                    let (Some(op), Some(named)) = (root.operation_type(), root.named_type()) else {
                        continue;
                    };
                    let key = if op.mutation_token().is_some() {
                        "mutationType"
                    } else if op.subscription_token().is_some() {
                        "subscriptionType"
                    } else {
                        "queryType"
                    };
                    if let Some(name) = named.name() {
                        roots.insert(key, name.text().to_string());
                    }
                }
                continue;
            }
            _ => continue,
        };
        if let Some(name) = name {
            kinds.insert(name.text().to_string(), kind);
        }
    }

    for (key, default) in [
        ("queryType", "Query"),
        ("mutationType", "Mutation"),
        ("subscriptionType", "Subscription"),
    ] {
        if !roots.contains_key(key) && kinds.contains_key(default) {
            roots.insert(key, default.to_string());
        }
    }

    let mut types = Vec::new();
    for definition in document.definitions() {
        let ty = match definition {
            cst::Definition::ObjectTypeDefinition(obj) => json!({
                "kind": "OBJECT",
                "name": name_of(obj.name()),
                "fields": obj
                    .fields_definition()
                    .into_iter()
                    .flat_map(|f| f.field_definitions())
                    .map(|f| field_json(&f, &kinds))
                    .collect::<Vec<_>>(),
                "interfaces": obj
                    .implements_interfaces()
                    .into_iter()
                    .flat_map(|i| i.named_types())
                    .map(|t| named_ref(&name_of(t.name()), &kinds))
                    .collect::<Vec<_>>(),
                "possibleTypes": null,
                "enumValues": null,
                "inputFields": null,
            }),
            cst::Definition::InterfaceTypeDefinition(iface) => json!({
                "kind": "INTERFACE",
                "name": name_of(iface.name()),
                "fields": iface
                    .fields_definition()
                    .into_iter()
                    .flat_map(|f| f.field_definitions())
                    .map(|f| field_json(&f, &kinds))
                    .collect::<Vec<_>>(),
                "interfaces": iface
                    .implements_interfaces()
                    .into_iter()
                    .flat_map(|i| i.named_types())
                    .map(|t| named_ref(&name_of(t.name()), &kinds))
                    .collect::<Vec<_>>(),
            }),
            cst::Definition::UnionTypeDefinition(union) => json!({
                "kind": "UNION",
                "name": name_of(union.name()),
                "possibleTypes": union
                    .union_member_types()
                    .into_iter()
                    .flat_map(|m| m.named_types())
                    .map(|t| named_ref(&name_of(t.name()), &kinds))
                    .collect::<Vec<_>>(),
            }),
            cst::Definition::EnumTypeDefinition(enum_def) => json!({
                "kind": "ENUM",
                "name": name_of(enum_def.name()),
                "enumValues": enum_def
                    .enum_values_definition()
                    .into_iter()
                    .flat_map(|v| v.enum_value_definitions())
                    .map(|v| {
                        let (is_deprecated, reason) = deprecation(v.directives());
                        json!({
                            "name": name_of(v.enum_value().and_then(|e| e.name())),
                            "isDeprecated": is_deprecated,
                            "deprecationReason": reason,
                        })
                    })
                    .collect::<Vec<_>>(),
            }),
            cst::Definition::ScalarTypeDefinition(scalar) => json!({
                "kind": "SCALAR",
                "name": name_of(scalar.name()),
            }),
            cst::Definition::InputObjectTypeDefinition(input) => json!({
                "kind": "INPUT_OBJECT",
                "name": name_of(input.name()),
                "inputFields": input
                    .input_fields_definition()
                    .into_iter()
                    .flat_map(|f| f.input_value_definitions())
                    .map(|f| input_value_json(&f, &kinds))
                    .collect::<Vec<_>>(),
            }),
            _ => continue,
        };
        types.push(ty);
    }

    for scalar in BUILTIN_SCALARS {
        let declared = types.iter().any(|t| t["name"] == *scalar);
        if !declared {
            types.push(json!({ "kind": "SCALAR", "name": scalar }));
        }
    }

    let root = |key: &str| roots.get(key).map_or(Value::Null, |name| json!({ "name": name }));

    json!({
        "__schema": {
            "queryType": root("queryType"),
            "mutationType": root("mutationType"),
            "subscriptionType": root("subscriptionType"),
            "types": types,
        }
    })
}

/// [`sdl_to_introspection`] serialized to a JSON string.
pub fn sdl_to_introspection_string(sdl: &str) -> String {
    sdl_to_introspection(sdl).to_string()
}

fn name_of(name: Option<cst::Name>) -> String {
    name.map(|n| n.text().to_string()).unwrap_or_default()
}

fn field_json(field: &cst::FieldDefinition, kinds: &HashMap<String, &'static str>) -> Value {
    let (is_deprecated, reason) = deprecation(field.directives());
    json!({
        "name": name_of(field.name()),
        "args": field
            .arguments_definition()
            .into_iter()
            .flat_map(|a| a.input_value_definitions())
            .map(|a| input_value_json(&a, kinds))
            .collect::<Vec<_>>(),
        "type": field.ty().map_or(Value::Null, |ty| type_json(&ty, kinds)),
        "isDeprecated": is_deprecated,
        "deprecationReason": reason,
    })
}

fn input_value_json(
    value: &cst::InputValueDefinition,
    kinds: &HashMap<String, &'static str>,
) -> Value {
    let (is_deprecated, reason) = deprecation(value.directives());
    json!({
        "name": name_of(value.name()),
        "type": value.ty().map_or(Value::Null, |ty| type_json(&ty, kinds)),
        "defaultValue": value
            .default_value()
            .and_then(|d| d.value())
            .map(|v| v.syntax().text().to_string()),
        "isDeprecated": is_deprecated,
        "deprecationReason": reason,
    })
}

fn type_json(ty: &cst::Type, kinds: &HashMap<String, &'static str>) -> Value {
    match ty {
        cst::Type::NamedType(named) => named_ref(&name_of(named.name()), kinds),
        cst::Type::ListType(list) => list_json(list, kinds),
        cst::Type::NonNullType(non_null) => {
            let inner = if let Some(named) = non_null.named_type() {
                named_ref(&name_of(named.name()), kinds)
            } else if let Some(list) = non_null.list_type() {
                list_json(&list, kinds)
            } else {
                Value::Null
            };
            json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
        }
    }
}

fn list_json(list: &cst::ListType, kinds: &HashMap<String, &'static str>) -> Value {
    json!({
        "kind": "LIST",
        "name": null,
        "ofType": list.ty().map_or(Value::Null, |ty| type_json(&ty, kinds)),
    })
}

fn named_ref(name: &str, kinds: &HashMap<String, &'static str>) -> Value {
    json!({
        "kind": kinds.get(name).copied().unwrap_or("OBJECT"),
        "name": name,
        "ofType": null,
    })
}

/// `(isDeprecated, deprecationReason)` from a directive list.
fn deprecation(directives: Option<cst::Directives>) -> (bool, Value) {
    let Some(deprecated) = directives
        .into_iter()
        .flat_map(|d| d.directives())
        .find(|d| d.name().is_some_and(|n| n.text().as_str() == "deprecated"))
    else {
        return (false, Value::Null);
    };

    let reason = deprecated
        .arguments()
        .into_iter()
        .flat_map(|a| a.arguments())
        .find(|a| a.name().is_some_and(|n| n.text().as_str() == "reason"))
        .and_then(|a| a.value())
        .map_or(Value::Null, |v| {
            Value::String(v.syntax().text().to_string().trim_matches('"').to_string())
        });

    (true, reason)
}
