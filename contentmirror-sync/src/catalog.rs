//! Entity catalog: which kinds the source exposes and where to fetch them.
//!
//! Built once per session from two source documents, the entity map and the
//! dereferenced schema. Both are required; failing to fetch either aborts
//! discovery before any store is touched.

use crate::error::{SyncError, SyncResult};
use crate::source::ContentSource;
use contentmirror_model::{descriptors_from_schema, FieldDescriptor, ModelDefinition};
use contentmirror_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Placeholder for the instance id in single-fetch paths.
pub const ID_PLACEHOLDER: &str = ":id";

/// One entity kind and its fetch endpoints, as listed in the entity map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    #[serde(rename = "entityName")]
    pub name: String,
    /// Path template containing [`ID_PLACEHOLDER`].
    #[serde(rename = "singlePath")]
    pub single_path: String,
    #[serde(rename = "listPath")]
    pub list_path: String,
}

impl EntityDescriptor {
    pub fn new(
        name: impl Into<String>,
        single_path: impl Into<String>,
        list_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            single_path: single_path.into(),
            list_path: list_path.into(),
        }
    }

    /// The single-fetch path with `id` percent-encoded into the placeholder.
    pub fn single_path_for(&self, id: &EntityId) -> String {
        self.single_path
            .replace(ID_PLACEHOLDER, &urlencoding::encode(id.as_str()))
    }
}

/// The set of entity kinds exposed by the source, in entity-map order, plus
/// the schema document describing their attributes.
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    descriptors: Vec<EntityDescriptor>,
    schema: Value,
    schema_prefix: String,
}

impl EntityCatalog {
    /// Fetches the entity map and schema document from the source.
    ///
    /// Every call is an independent fetch.
    pub async fn discover(source: &dyn ContentSource, schema_prefix: &str) -> SyncResult<Self> {
        info!("Discovering entity kinds from {}", source.source_name());

        let (routes, schema) = tokio::try_join!(
            async {
                source
                    .fetch_entity_map()
                    .await
                    .map_err(|e| SyncError::discovery("entity map", e))
            },
            async {
                source
                    .fetch_schema()
                    .await
                    .map_err(|e| SyncError::discovery("schema", e))
            },
        )?;

        let catalog = Self::from_parts(routes, schema, schema_prefix)?;
        info!("Discovered {} entity kinds", catalog.len());
        Ok(catalog)
    }

    /// Builds a catalog from already fetched documents.
    ///
    /// A kind listed twice keeps its first position and takes the later
    /// entry's endpoints.
    pub fn from_parts(
        routes: Vec<EntityDescriptor>,
        schema: Value,
        schema_prefix: &str,
    ) -> SyncResult<Self> {
        if !schema.is_object() {
            return Err(SyncError::InvalidCatalog(
                "schema document is not a JSON object".into(),
            ));
        }

        let mut descriptors: Vec<EntityDescriptor> = Vec::with_capacity(routes.len());
        for route in routes {
            if route.name.trim().is_empty() {
                return Err(SyncError::InvalidCatalog("entity with empty name".into()));
            }
            if route.list_path.trim().is_empty() {
                return Err(SyncError::InvalidCatalog(format!(
                    "{} has no list path",
                    route.name
                )));
            }

            match descriptors.iter_mut().find(|d| d.name == route.name) {
                Some(existing) => {
                    debug!("Entity map lists {} twice; keeping the later endpoints", route.name);
                    *existing = route;
                }
                None => descriptors.push(route),
            }
        }

        Ok(Self {
            descriptors,
            schema,
            schema_prefix: schema_prefix.to_string(),
        })
    }

    /// Descriptors in entity-map order.
    pub fn descriptors(&self) -> &[EntityDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, kind: &str) -> Option<&EntityDescriptor> {
        self.descriptors.iter().find(|d| d.name == kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Declared attributes of `kind`. A kind missing from the schema has
    /// no attributes.
    pub fn fields_for(&self, kind: &str) -> BTreeMap<String, FieldDescriptor> {
        match self.definition(kind) {
            Some(definition) => definition
                .get("properties")
                .map(descriptors_from_schema)
                .unwrap_or_default(),
            None => {
                debug!("No schema definition for {}", kind);
                BTreeMap::new()
            }
        }
    }

    /// Model definition for one kind.
    pub fn model_for(&self, kind: &str) -> ModelDefinition {
        ModelDefinition::from_descriptors(kind, &self.fields_for(kind))
    }

    /// Model definitions for every kind, in catalog order.
    pub fn models(&self) -> Vec<ModelDefinition> {
        self.kinds().map(|kind| self.model_for(kind)).collect()
    }

    /// Looks up `<prefix><kind>` under Swagger 2 `definitions`, then under
    /// OpenAPI 3 `components.schemas`.
    fn definition(&self, kind: &str) -> Option<&Value> {
        let key = format!("{}{}", self.schema_prefix, kind);
        self.schema
            .get("definitions")
            .and_then(|defs| defs.get(&key))
            .or_else(|| {
                self.schema
                    .pointer("/components/schemas")
                    .and_then(|defs| defs.get(&key))
            })
    }
}
