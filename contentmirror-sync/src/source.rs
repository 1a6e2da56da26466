//! Content source abstraction.
//!
//! The engine reads four things from the source: the entity map, the schema
//! document, per-kind collections (plus single instances), and the change
//! feed. [`HttpSource`](crate::http::HttpSource) talks to a live source;
//! [`mock::MockSource`] serves canned data for tests.

use crate::catalog::EntityDescriptor;
use crate::error::SyncResult;
use async_trait::async_trait;
use contentmirror_types::{EntityId, EntityInstance};
use serde_json::Value;

/// A remote content source the engine mirrors from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable name used in logs.
    fn source_name(&self) -> &str;

    /// Fetches the entity map: every kind with its single and list paths.
    async fn fetch_entity_map(&self) -> SyncResult<Vec<EntityDescriptor>>;

    /// Fetches the dereferenced schema document.
    async fn fetch_schema(&self) -> SyncResult<Value>;

    /// Fetches the full current collection of one kind.
    async fn fetch_collection(
        &self,
        descriptor: &EntityDescriptor,
    ) -> SyncResult<Vec<EntityInstance>>;

    /// Fetches one instance. `Ok(None)` when the source does not have it.
    async fn fetch_single(
        &self,
        descriptor: &EntityDescriptor,
        id: &EntityId,
    ) -> SyncResult<Option<EntityInstance>>;

    /// Fetches the next batch of changes as raw feed elements, in feed
    /// order. The source tracks the checkpoint; each call returns what
    /// changed since the previous one. Elements are decoded one by one by
    /// the change sync driver so a malformed record only loses itself.
    async fn fetch_changes(&self) -> SyncResult<Vec<Value>>;
}

/// An in-memory source for testing.
pub mod mock {
    use super::*;
    use crate::error::SyncError;
    use contentmirror_types::ChangeRecord;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    #[derive(Debug, Default)]
    struct MockState {
        routes: Vec<EntityDescriptor>,
        schema: Value,
        collections: HashMap<String, Vec<EntityInstance>>,
        change_batches: VecDeque<Vec<Value>>,
        failing_kinds: HashSet<String>,
        fail_discovery: bool,
        list_fetches: Vec<String>,
        change_fetches: usize,
    }

    /// Serves canned documents and records what was fetched.
    #[derive(Debug)]
    pub struct MockSource {
        state: Mutex<MockState>,
    }

    impl Default for MockSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSource {
        /// Creates an empty source with an empty schema document.
        pub fn new() -> Self {
            Self {
                state: Mutex::new(MockState {
                    schema: Value::Object(Default::default()),
                    ..Default::default()
                }),
            }
        }

        fn lock(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Adds a kind with the conventional `/entity/...` paths and its
        /// initial collection.
        pub fn with_kind(self, kind: &str, instances: Vec<EntityInstance>) -> Self {
            {
                let mut state = self.lock();
                state.routes.push(EntityDescriptor::new(
                    kind,
                    format!("/entity/single/{kind}/:id"),
                    format!("/entity/list/{kind}/"),
                ));
                state.collections.insert(kind.to_string(), instances);
            }
            self
        }

        /// Replaces the schema document.
        pub fn with_schema(self, schema: Value) -> Self {
            self.lock().schema = schema;
            self
        }

        /// Queues a batch for the next `fetch_changes` call.
        pub fn push_changes(&self, batch: Vec<ChangeRecord>) {
            let raw = batch
                .into_iter()
                .filter_map(|change| serde_json::to_value(change).ok())
                .collect();
            self.push_raw_changes(raw);
        }

        /// Queues a batch of feed elements exactly as the source would
        /// serve them, malformed ones included.
        pub fn push_raw_changes(&self, batch: Vec<Value>) {
            self.lock().change_batches.push_back(batch);
        }

        /// Lets list fetches for `kind` succeed again.
        pub fn restore_kind(&self, kind: &str) {
            self.lock().failing_kinds.remove(kind);
        }

        /// Makes list fetches for `kind` fail with a network error.
        pub fn fail_kind(&self, kind: &str) {
            self.lock().failing_kinds.insert(kind.to_string());
        }

        /// Makes entity map and schema fetches fail.
        pub fn fail_discovery(&self) {
            self.lock().fail_discovery = true;
        }

        /// Replaces the served collection of `kind`.
        pub fn set_collection(&self, kind: &str, instances: Vec<EntityInstance>) {
            self.lock().collections.insert(kind.to_string(), instances);
        }

        /// Kinds whose list endpoint was fetched, in call order.
        pub fn list_fetches(&self) -> Vec<String> {
            self.lock().list_fetches.clone()
        }

        pub fn change_fetches(&self) -> usize {
            self.lock().change_fetches
        }
    }

    #[async_trait]
    impl ContentSource for MockSource {
        fn source_name(&self) -> &str {
            "mock"
        }

        async fn fetch_entity_map(&self) -> SyncResult<Vec<EntityDescriptor>> {
            let state = self.lock();
            if state.fail_discovery {
                return Err(SyncError::Network("entity map unreachable".into()));
            }
            Ok(state.routes.clone())
        }

        async fn fetch_schema(&self) -> SyncResult<Value> {
            let state = self.lock();
            if state.fail_discovery {
                return Err(SyncError::Network("schema unreachable".into()));
            }
            Ok(state.schema.clone())
        }

        async fn fetch_collection(
            &self,
            descriptor: &EntityDescriptor,
        ) -> SyncResult<Vec<EntityInstance>> {
            let mut state = self.lock();
            state.list_fetches.push(descriptor.name.clone());
            if state.failing_kinds.contains(&descriptor.name) {
                return Err(SyncError::Network(format!(
                    "{} list unreachable",
                    descriptor.name
                )));
            }
            state
                .collections
                .get(&descriptor.name)
                .cloned()
                .ok_or_else(|| SyncError::Http {
                    status: 404,
                    url: descriptor.list_path.clone(),
                })
        }

        async fn fetch_single(
            &self,
            descriptor: &EntityDescriptor,
            id: &EntityId,
        ) -> SyncResult<Option<EntityInstance>> {
            let state = self.lock();
            Ok(state.collections.get(&descriptor.name).and_then(|all| {
                all.iter()
                    .find(|instance| instance.id().as_ref() == Some(id))
                    .cloned()
            }))
        }

        async fn fetch_changes(&self) -> SyncResult<Vec<Value>> {
            let mut state = self.lock();
            state.change_fetches += 1;
            Ok(state.change_batches.pop_front().unwrap_or_default())
        }
    }
}
