//! Type definitions for GraphQL introspection responses.
//!
//! These types mirror the JSON returned by [`INTROSPECTION_QUERY`](crate::INTROSPECTION_QUERY).
//! They are deliberately lenient: list fields that a server omits or sends
//! as `null` deserialize to empty vectors, and `kind` is kept as the raw
//! string so an unrecognized kind can be reported by name instead of failing
//! the whole document.

use serde::{Deserialize, Deserializer, Serialize};

/// Complete GraphQL schema information from introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    pub query_type: Option<IntrospectionNamedRef>,
    pub mutation_type: Option<IntrospectionNamedRef>,
    pub subscription_type: Option<IntrospectionNamedRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<IntrospectionType>,
}

impl IntrospectionSchema {
    /// Locate `__schema` in a raw response.
    ///
    /// Accepts the bare result (`{"__schema": ...}`), the `data` payload of a
    /// GraphQL response (`{"data": {"__schema": ...}}`), and returns `None`
    /// when neither shape is present.
    #[must_use]
    pub fn locate(value: &serde_json::Value) -> Option<&serde_json::Value> {
        value
            .get("__schema")
            .or_else(|| value.get("data").and_then(|data| data.get("__schema")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionNamedRef {
    pub name: String,
}

/// One entry of `__schema.types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionType {
    pub kind: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: Vec<IntrospectionField>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input_fields: Vec<IntrospectionInputValue>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interfaces: Vec<IntrospectionTypeRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub enum_values: Vec<IntrospectionEnumValue>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub possible_types: Vec<IntrospectionTypeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionField {
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: IntrospectionTypeRef,
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

/// A possibly wrapped type reference (`ofType` chain).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionTypeRef {
    pub kind: String,
    pub name: Option<String>,
    pub of_type: Option<Box<IntrospectionTypeRef>>,
}

impl IntrospectionTypeRef {
    /// Converts the type reference to a GraphQL type string.
    ///
    /// ```
    /// # use query_analyzer_introspect::IntrospectionTypeRef;
    /// let type_ref = IntrospectionTypeRef {
    ///     kind: "NON_NULL".to_string(),
    ///     name: None,
    ///     of_type: Some(Box::new(IntrospectionTypeRef {
    ///         kind: "SCALAR".to_string(),
    ///         name: Some("String".to_string()),
    ///         of_type: None,
    ///     })),
    /// };
    /// assert_eq!(type_ref.to_type_string(), "String!");
    /// ```
    #[must_use]
    pub fn to_type_string(&self) -> String {
        match self.kind.as_str() {
            "NON_NULL" => self.of_type.as_ref().map_or_else(
                || "!".to_string(),
                |of_type| format!("{}!", of_type.to_type_string()),
            ),
            "LIST" => self.of_type.as_ref().map_or_else(
                || "[]".to_string(),
                |of_type| format!("[{}]", of_type.to_type_string()),
            ),
            _ => self.name.as_deref().unwrap_or_default().to_string(),
        }
    }
}

impl std::fmt::Display for IntrospectionTypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_type_string())
    }
}

/// One entry of `publicApiVersions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersion {
    /// Version handle, e.g. `2024-10` or `unstable`
    pub handle: String,
    /// Human name, e.g. `October 2024`
    pub display_name: String,
    pub supported: bool,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_locate_bare_and_wrapped() {
        let bare = json!({ "__schema": { "types": [] } });
        let wrapped = json!({ "data": { "__schema": { "types": [] } } });
        let neither = json!({ "data": {} });

        assert!(IntrospectionSchema::locate(&bare).is_some());
        assert!(IntrospectionSchema::locate(&wrapped).is_some());
        assert!(IntrospectionSchema::locate(&neither).is_none());
    }

    #[test]
    fn test_null_lists_become_empty() {
        let ty: IntrospectionType = serde_json::from_value(json!({
            "kind": "SCALAR",
            "name": "DateTime",
            "fields": null,
            "enumValues": null
        }))
        .unwrap();

        assert_eq!(ty.kind, "SCALAR");
        assert!(ty.fields.is_empty());
        assert!(ty.enum_values.is_empty());
        assert!(ty.possible_types.is_empty());
    }

    #[test]
    fn test_nested_type_string() {
        let type_ref: IntrospectionTypeRef = serde_json::from_value(json!({
            "kind": "NON_NULL",
            "name": null,
            "ofType": {
                "kind": "LIST",
                "name": null,
                "ofType": {
                    "kind": "NON_NULL",
                    "name": null,
                    "ofType": { "kind": "OBJECT", "name": "Order", "ofType": null }
                }
            }
        }))
        .unwrap();

        assert_eq!(type_ref.to_type_string(), "[Order!]!");
    }

    #[test]
    fn test_api_version_deserialize() {
        let version: ApiVersion = serde_json::from_value(json!({
            "handle": "2025-01",
            "displayName": "2025-01 (Latest)",
            "supported": true
        }))
        .unwrap();

        assert_eq!(version.handle, "2025-01");
        assert!(version.supported);
    }
}
