//! In-memory target store.
//!
//! Upserts by id into a sorted map per kind. Used by tests and as a
//! reference for what the engine expects from a store.

use crate::error::{SyncError, SyncResult};
use crate::store::{ModelStore, ModelStoreFactory};
use async_trait::async_trait;
use contentmirror_model::ModelDefinition;
use contentmirror_types::{EntityId, EntityInstance};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// One entity kind held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    kind: String,
    model: RwLock<ModelDefinition>,
    entities: RwLock<BTreeMap<EntityId, EntityInstance>>,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(model: ModelDefinition) -> Self {
        Self {
            kind: model.name.clone(),
            model: RwLock::new(model),
            entities: RwLock::new(BTreeMap::new()),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// The most recent definition this store was given.
    pub async fn model(&self) -> ModelDefinition {
        self.model.read().await.clone()
    }

    /// Replaces the definition, keeping stored instances.
    pub async fn redefine(&self, model: ModelDefinition) {
        *self.model.write().await = model;
    }

    pub async fn get(&self, id: &str) -> Option<EntityInstance> {
        self.entities.read().await.get(&EntityId::from(id)).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.entities.read().await.contains_key(&EntityId::from(id))
    }

    /// Stored ids, sorted.
    pub async fn ids(&self) -> Vec<EntityId> {
        self.entities.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// Copy of every stored instance, keyed by id.
    pub async fn snapshot(&self) -> BTreeMap<EntityId, EntityInstance> {
        self.entities.read().await.clone()
    }

    /// Number of `create` calls received, including rejected ones.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::Relaxed)
    }

    /// Number of `delete` calls received.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    fn kind(&self) -> &str {
        &self.kind
    }

    /// All-or-nothing: a batch with any id-less instance stores nothing.
    async fn create(&self, instances: Vec<EntityInstance>) -> SyncResult<()> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);

        let keyed = instances
            .into_iter()
            .map(|instance| match instance.id() {
                Some(id) => Ok((id, instance)),
                None => Err(SyncError::MissingId {
                    kind: self.kind.clone(),
                }),
            })
            .collect::<SyncResult<Vec<_>>>()?;

        let mut entities = self.entities.write().await;
        for (id, instance) in keyed {
            entities.insert(id, instance);
        }
        debug!("{} now holds {} instances", self.kind, entities.len());
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> SyncResult<()> {
        self.delete_calls.fetch_add(1, Ordering::Relaxed);

        if self.entities.write().await.remove(id).is_none() {
            debug!("{} has no instance {} to delete", self.kind, id);
        }
        Ok(())
    }
}

/// Hands out [`MemoryStore`]s and keeps them reachable for inspection.
///
/// Defining a model twice returns the existing store with its contents and
/// the new definition.
#[derive(Debug, Default)]
pub struct MemoryStoreFactory {
    stores: RwLock<BTreeMap<String, Arc<MemoryStore>>>,
}

impl MemoryStoreFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store defined for `kind`, if any.
    pub async fn store(&self, kind: &str) -> Option<Arc<MemoryStore>> {
        self.stores.read().await.get(kind).cloned()
    }

    /// Kinds defined so far, sorted.
    pub async fn kinds(&self) -> Vec<String> {
        self.stores.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ModelStoreFactory for MemoryStoreFactory {
    async fn define(&self, model: &ModelDefinition) -> SyncResult<Arc<dyn ModelStore>> {
        let mut stores = self.stores.write().await;
        let store = match stores.get(&model.name) {
            Some(existing) => {
                existing.redefine(model.clone()).await;
                existing.clone()
            }
            None => {
                let created = Arc::new(MemoryStore::new(model.clone()));
                stores.insert(model.name.clone(), created.clone());
                created
            }
        };
        Ok(store as Arc<dyn ModelStore>)
    }
}
