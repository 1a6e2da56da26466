//! Target store contract.
//!
//! The engine never owns mirrored data. It calls a [`ModelStore`] per entity
//! kind, obtained from a [`ModelStoreFactory`] during the model definition
//! phase, and holds instances only for the duration of one call.

use crate::error::SyncResult;
use async_trait::async_trait;
use contentmirror_model::ModelDefinition;
use contentmirror_types::{EntityId, EntityInstance};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Write handle for one entity kind in the target store.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Entity kind this store holds.
    fn kind(&self) -> &str;

    /// Inserts or overwrites instances by id.
    ///
    /// Create and update both land here; a store that must tell them apart
    /// can compare against its current contents.
    async fn create(&self, instances: Vec<EntityInstance>) -> SyncResult<()>;

    /// Removes the instance with `id`. Removing an absent id is not an
    /// error. Stores that track reverse references drop `id` from them too.
    async fn delete(&self, id: &EntityId) -> SyncResult<()>;
}

/// Defines models in the target store and hands back their write handles.
#[async_trait]
pub trait ModelStoreFactory: Send + Sync {
    async fn define(&self, model: &ModelDefinition) -> SyncResult<Arc<dyn ModelStore>>;
}

/// Write handles keyed by entity kind.
#[derive(Clone, Default)]
pub struct StoreSet {
    stores: BTreeMap<String, Arc<dyn ModelStore>>,
}

impl StoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines every model through `factory`.
    pub async fn define_all(
        models: &[ModelDefinition],
        factory: &dyn ModelStoreFactory,
    ) -> SyncResult<Self> {
        let mut set = Self::new();
        for model in models {
            debug!("Defining model {} ({} fields)", model.name, model.fields.len());
            let store = factory.define(model).await?;
            set.insert(model.name.clone(), store);
        }
        Ok(set)
    }

    /// Registers `store` under `kind`, replacing any previous handle.
    pub fn insert(&mut self, kind: impl Into<String>, store: Arc<dyn ModelStore>) {
        self.stores.insert(kind.into(), store);
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn ModelStore>> {
        self.stores.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.stores.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl std::fmt::Debug for StoreSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSet")
            .field("kinds", &self.stores.keys().collect::<Vec<_>>())
            .finish()
    }
}
