//! Reading field descriptors out of the source's JSON schema.
//!
//! The source publishes a dereferenced Swagger/OpenAPI document. Relationship
//! properties appear there as nested `object` / `array` schemas whose own
//! `type` property is a string literal naming the referenced kind. This module
//! is the only place that knows that convention; everything downstream works
//! with an explicit `refers_to`.

use crate::schema::{FieldDescriptor, PrimitiveType};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property on a nested schema whose literal value names the entity kind.
pub const DISCRIMINATOR: &str = "type";

impl FieldDescriptor {
    /// Converts one JSON-schema property into a descriptor.
    ///
    /// Returns `None` when the property has no usable `type`; callers skip
    /// such fields.
    pub fn from_schema_property(property: &Value) -> Option<Self> {
        match schema_type(property)? {
            "object" => Some(Self::Reference {
                refers_to: discriminator(property.get("properties")),
            }),
            "array" => Some(Self::ReferenceList {
                refers_to: discriminator(
                    property.get("items").and_then(|items| items.get("properties")),
                ),
            }),
            other => PrimitiveType::from_schema_type(other).map(Self::scalar),
        }
    }
}

/// Converts a schema `properties` object into descriptors, skipping
/// malformed entries. Anything other than an object yields an empty map.
pub fn descriptors_from_schema(properties: &Value) -> BTreeMap<String, FieldDescriptor> {
    let Some(properties) = properties.as_object() else {
        return BTreeMap::new();
    };

    properties
        .iter()
        .filter_map(|(name, property)| {
            FieldDescriptor::from_schema_property(property).map(|d| (name.clone(), d))
        })
        .collect()
}

/// The `type` keyword of a schema. Nullable unions such as
/// `["string", "null"]` resolve to their first non-null member.
fn schema_type(property: &Value) -> Option<&str> {
    match property.get("type")? {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}

/// The literal carried by the discriminator property: `const`, or a
/// single-value `enum`.
fn discriminator(properties: Option<&Value>) -> Option<String> {
    let tag = properties?.get(DISCRIMINATOR)?;

    if let Some(name) = tag.get("const").and_then(Value::as_str) {
        return Some(name.to_string());
    }

    match tag.get("enum").and_then(Value::as_array).map(Vec::as_slice) {
        Some([Value::String(name)]) => Some(name.clone()),
        _ => None,
    }
}
