use contentmirror_model::{descriptors_from_schema, FieldDescriptor, PrimitiveType};
use pretty_assertions::assert_eq;
use serde_json::json;

/// `properties` of `Schema_PageEntity` as the mock CMS publishes it.
fn page_properties() -> serde_json::Value {
    json!({
        "id": {"type": "string"},
        "path": {"type": "string"},
        "description": {"type": "string"},
        "title": {"type": "string"},
        "author": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "username": {"type": "string"},
                "type": {"type": "string", "const": "UserEntity"}
            }
        },
        "type": {"type": "string", "enum": ["PageEntity"]}
    })
}

#[test]
fn scalar_property() {
    assert_eq!(
        FieldDescriptor::from_schema_property(&json!({"type": "string"})),
        Some(FieldDescriptor::scalar(PrimitiveType::String))
    );
    assert_eq!(
        FieldDescriptor::from_schema_property(&json!({"type": "integer"})),
        Some(FieldDescriptor::scalar(PrimitiveType::Integer))
    );
}

#[test]
fn nullable_union_uses_non_null_member() {
    assert_eq!(
        FieldDescriptor::from_schema_property(&json!({"type": ["null", "boolean"]})),
        Some(FieldDescriptor::scalar(PrimitiveType::Boolean))
    );
}

#[test]
fn object_with_const_discriminator() {
    let props = page_properties();
    assert_eq!(
        FieldDescriptor::from_schema_property(&props["author"]),
        Some(FieldDescriptor::reference("UserEntity"))
    );
}

#[test]
fn array_with_enum_discriminator() {
    let property = json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "type": {"type": "string", "enum": ["PageEntity"]}
            }
        }
    });
    assert_eq!(
        FieldDescriptor::from_schema_property(&property),
        Some(FieldDescriptor::reference_list("PageEntity"))
    );
}

#[test]
fn missing_discriminator_is_unresolved() {
    assert_eq!(
        FieldDescriptor::from_schema_property(&json!({"type": "object"})),
        Some(FieldDescriptor::Reference { refers_to: None })
    );
    assert_eq!(
        FieldDescriptor::from_schema_property(&json!({"type": "array", "items": {"type": "string"}})),
        Some(FieldDescriptor::ReferenceList { refers_to: None })
    );
}

#[test]
fn ambiguous_enum_is_unresolved() {
    let property = json!({
        "type": "object",
        "properties": {"type": {"enum": ["UserEntity", "PageEntity"]}}
    });
    assert_eq!(
        FieldDescriptor::from_schema_property(&property),
        Some(FieldDescriptor::Reference { refers_to: None })
    );
}

#[test]
fn malformed_properties_are_skipped() {
    assert_eq!(FieldDescriptor::from_schema_property(&json!({})), None);
    assert_eq!(FieldDescriptor::from_schema_property(&json!({"type": "null"})), None);
    assert_eq!(FieldDescriptor::from_schema_property(&json!({"type": 3})), None);
    assert_eq!(FieldDescriptor::from_schema_property(&json!({"$ref": "#/x"})), None);
}

#[test]
fn whole_schema() {
    let descriptors = descriptors_from_schema(&page_properties());
    assert_eq!(descriptors.len(), 6);
    assert_eq!(descriptors["author"], FieldDescriptor::reference("UserEntity"));
    assert_eq!(descriptors["title"], FieldDescriptor::scalar(PrimitiveType::String));
    assert_eq!(descriptors["type"], FieldDescriptor::scalar(PrimitiveType::String));
}

#[test]
fn whole_schema_skips_bad_entries() {
    let descriptors = descriptors_from_schema(&json!({
        "ok": {"type": "number"},
        "bad": {"description": "no type"},
        "worse": 17
    }));
    assert_eq!(descriptors.len(), 1);
    assert!(descriptors.contains_key("ok"));
}

#[test]
fn non_object_schema_is_empty() {
    assert!(descriptors_from_schema(&json!(null)).is_empty());
    assert!(descriptors_from_schema(&json!(["a"])).is_empty());
}
