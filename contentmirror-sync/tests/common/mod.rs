//! Shared fixtures for sync tests: the mock CMS's two entity kinds.

#![allow(dead_code)]

use contentmirror_sync::source::mock::MockSource;
use contentmirror_types::EntityInstance;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub const USER: &str = "UserEntity";
pub const PAGE: &str = "PageEntity";

/// Installs a test-writer subscriber honoring `RUST_LOG`. Safe to call
/// from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn instance(value: Value) -> EntityInstance {
    EntityInstance::from_value(value).expect("fixture is an object")
}

pub fn user(id: &str) -> EntityInstance {
    instance(json!({
        "id": id,
        "type": USER,
        "username": "Tyler",
        "email": "tyler@example.com",
        "password": "oh noe",
        "authoredPages": [{"id": "1"}]
    }))
}

pub fn page(id: &str, title: &str) -> EntityInstance {
    instance(json!({
        "id": id,
        "type": PAGE,
        "path": format!("/page/{id}"),
        "description": "A page!",
        "title": title,
        "author": {"id": "1", "type": USER}
    }))
}

/// Page "1" titled "Hello world" plus pages "2" to "6".
pub fn pages() -> Vec<EntityInstance> {
    let mut all = vec![page("1", "Hello world")];
    all.extend((2..=6).map(|n| page(&n.to_string(), &format!("Page {n}"))));
    all
}

/// Dereferenced Swagger document as the mock CMS publishes it.
pub fn schema_document() -> Value {
    json!({
        "swagger": "2.0",
        "definitions": {
            "Schema_UserEntity": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "username": {"type": "string"},
                    "email": {"type": "string"},
                    "password": {"type": "string"},
                    "authoredPages": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "title": {"type": "string"},
                                "type": {"type": "string", "enum": [PAGE]}
                            }
                        }
                    },
                    "type": {"type": "string", "enum": [USER]}
                }
            },
            "Schema_PageEntity": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "path": {"type": "string"},
                    "description": {"type": "string"},
                    "title": {"type": "string"},
                    "author": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "username": {"type": "string"},
                            "type": {"type": "string", "enum": [USER]}
                        }
                    },
                    "type": {"type": "string", "enum": [PAGE]}
                }
            }
        }
    })
}

/// Entity map body listing both kinds.
pub fn entity_map() -> Value {
    json!([
        {"entityName": USER, "singlePath": "/entity/single/UserEntity/:id", "listPath": "/entity/list/UserEntity/"},
        {"entityName": PAGE, "singlePath": "/entity/single/PageEntity/:id", "listPath": "/entity/list/PageEntity/"}
    ])
}

/// Mock CMS with one user and six pages.
pub fn cms_source() -> MockSource {
    MockSource::new()
        .with_schema(schema_document())
        .with_kind(USER, vec![user("1")])
        .with_kind(PAGE, pages())
}
