use contentmirror_types::{EntityId, EntityInstance};
use proptest::prelude::*;
use serde_json::json;

fn page() -> EntityInstance {
    EntityInstance::from_value(json!({
        "id": "1",
        "type": "PageEntity",
        "title": "Hello world",
        "published": true,
        "views": 12,
        "author": { "id": "1", "type": "UserEntity" }
    }))
    .unwrap()
}

#[test]
fn from_value_rejects_non_objects() {
    assert!(EntityInstance::from_value(json!([1, 2])).is_none());
    assert!(EntityInstance::from_value(json!("x")).is_none());
    assert!(EntityInstance::from_value(json!(null)).is_none());
}

#[test]
fn string_id() {
    assert_eq!(page().id(), Some(EntityId::new("1")));
}

#[test]
fn numeric_id_renders_as_decimal() {
    let e = EntityInstance::from_value(json!({"id": 7})).unwrap();
    assert_eq!(e.id(), Some(EntityId::new("7")));
}

#[test]
fn missing_or_unusable_id() {
    assert_eq!(EntityInstance::new().id(), None);
    let empty = EntityInstance::from_value(json!({"id": ""})).unwrap();
    assert_eq!(empty.id(), None);
    let nested = EntityInstance::from_value(json!({"id": {"v": 1}})).unwrap();
    assert_eq!(nested.id(), None);
}

#[test]
fn id_only_shape() {
    let e = EntityInstance::id_only("2");
    assert_eq!(e.into_value(), json!({"id": "2"}));
}

#[test]
fn pointer_accessors() {
    let e = page();
    assert_eq!(e.get_str("/title"), Some("Hello world"));
    assert_eq!(e.get_str("/author/type"), Some("UserEntity"));
    assert_eq!(e.get_bool("/published"), Some(true));
    assert_eq!(e.get_number("/views"), Some(12.0));
    assert_eq!(e.get_str("/missing"), None);
    assert_eq!(e.get_str("title"), None);
}

#[test]
fn with_builds_and_overwrites() {
    let e = EntityInstance::id_only("1").with("title", "a").with("title", "b");
    assert_eq!(e.get_str("/title"), Some("b"));
    assert_eq!(e.keys().count(), 2);
}

proptest! {
    #[test]
    fn id_only_roundtrips_any_non_empty_id(id in "[a-zA-Z0-9_-]{1,16}") {
        let e = EntityInstance::id_only(id.clone());
        prop_assert_eq!(e.id(), Some(EntityId::new(id)));
    }
}

#[test]
fn pointer_unescapes_tokens() {
    let e = EntityInstance::from_value(json!({
        "a/b": {"c~d": "slash and tilde"}
    }))
    .unwrap();
    assert_eq!(e.get_str("/a~1b/c~0d"), Some("slash and tilde"));
}

#[test]
fn decoding_rejects_non_objects() {
    assert!(serde_json::from_value::<EntityInstance>(json!(null)).is_err());
    assert!(serde_json::from_value::<EntityInstance>(json!([{"id": "1"}])).is_err());

    let decoded: EntityInstance = serde_json::from_value(json!({"id": "1"})).unwrap();
    assert_eq!(decoded.id(), Some(EntityId::new("1")));
    assert_eq!(serde_json::to_value(&decoded).unwrap(), json!({"id": "1"}));
}
