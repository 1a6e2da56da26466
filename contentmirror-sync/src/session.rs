//! Sync session: orchestrates discovery, full sync and change polling.
//!
//! A session serializes its passes: every operation takes the session lock
//! for its whole duration, so a full sync and a change sync can never write
//! to the same stores at once.

use crate::catalog::EntityCatalog;
use crate::change_sync;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::full_sync::{retry_kinds, run_full_sync};
use crate::http::HttpSource;
use crate::report::PhaseReport;
use crate::source::ContentSource;
use crate::store::{ModelStoreFactory, StoreSet};
use contentmirror_model::ModelDefinition;
use contentmirror_types::EntityId;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[derive(Default)]
struct SessionState {
    catalog: Option<EntityCatalog>,
    stores: StoreSet,
    loaded: bool,
    /// Kinds the last full sync or retry could not load.
    unloaded: Vec<String>,
}

/// One mirror of one content source into one target store.
pub struct SyncSession {
    config: SyncConfig,
    source: Arc<dyn ContentSource>,
    factory: Arc<dyn ModelStoreFactory>,
    state: Mutex<SessionState>,
}

impl SyncSession {
    /// Creates a session over an existing source.
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn ContentSource>,
        factory: Arc<dyn ModelStoreFactory>,
    ) -> Self {
        Self {
            config,
            source,
            factory,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Creates a session talking HTTP to `config.api_base_url`.
    pub fn connect(config: SyncConfig, factory: Arc<dyn ModelStoreFactory>) -> SyncResult<Self> {
        let source = Arc::new(HttpSource::new(config.clone())?);
        Ok(Self::new(config, source, factory))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Discovers the catalog and defines one store per entity kind.
    ///
    /// Any discovery failure aborts before a store is defined. Calling this
    /// again re-discovers; the session must then be fully synced again.
    pub async fn define_models(&self) -> SyncResult<Vec<ModelDefinition>> {
        let mut state = self.state.lock().await;

        let catalog = EntityCatalog::discover(self.source.as_ref(), &self.config.schema_prefix).await?;
        let models = catalog.models();
        let stores = StoreSet::define_all(&models, self.factory.as_ref()).await?;

        for model in &models {
            info!("Defined model {} ({} fields)", model.name, model.fields.len());
        }

        state.catalog = Some(catalog);
        state.stores = stores;
        state.loaded = false;
        state.unloaded.clear();
        Ok(models)
    }

    /// Loads every kind from scratch.
    ///
    /// Kinds that fail are remembered and reloaded by
    /// [`retry_unloaded`](Self::retry_unloaded).
    pub async fn full_sync(&self) -> SyncResult<PhaseReport> {
        let mut state = self.state.lock().await;
        let catalog = state.catalog.as_ref().ok_or(SyncError::NotDiscovered)?;

        let report = run_full_sync(
            self.source.as_ref(),
            catalog,
            &state.stores,
            self.config.full_sync_concurrency,
        )
        .await;

        state.loaded = true;
        state.unloaded = report.failed_kinds();
        Ok(report)
    }

    /// Reloads the kinds the last full sync could not load, one list fetch
    /// and one bulk create each. `Ok(None)` when nothing is pending.
    pub async fn retry_unloaded(&self) -> SyncResult<Option<PhaseReport>> {
        let mut state = self.state.lock().await;
        let catalog = state.catalog.as_ref().ok_or(SyncError::NotDiscovered)?;
        if !state.loaded {
            return Err(SyncError::FullSyncRequired);
        }
        if state.unloaded.is_empty() {
            return Ok(None);
        }

        info!("Retrying {} unloaded kinds", state.unloaded.len());
        let report = retry_kinds(
            self.source.as_ref(),
            catalog,
            &state.unloaded,
            &state.stores,
            self.config.full_sync_concurrency,
        )
        .await;

        state.unloaded = report.failed_kinds();
        Ok(Some(report))
    }

    /// Fetches and applies one batch from the change feed.
    pub async fn sync_changes(&self) -> SyncResult<PhaseReport> {
        let state = self.state.lock().await;
        if state.catalog.is_none() {
            return Err(SyncError::NotDiscovered);
        }
        if !state.loaded {
            return Err(SyncError::FullSyncRequired);
        }

        change_sync::sync_changes(self.source.as_ref(), &state.stores).await
    }

    /// Re-reads one instance from the source's single endpoint.
    ///
    /// Upserts it when the source has it and deletes it locally when the
    /// source answers 404. Returns whether the instance exists.
    pub async fn refresh_entity(&self, kind: &str, id: &EntityId) -> SyncResult<bool> {
        let state = self.state.lock().await;
        let catalog = state.catalog.as_ref().ok_or(SyncError::NotDiscovered)?;
        let descriptor = catalog
            .get(kind)
            .ok_or_else(|| SyncError::UnknownEntityKind(kind.to_string()))?;
        let store = state
            .stores
            .get(kind)
            .ok_or_else(|| SyncError::UnknownEntityKind(kind.to_string()))?;

        match self.source.fetch_single(descriptor, id).await? {
            Some(instance) => {
                store.create(vec![instance]).await?;
                info!("  -> refreshed {} \"{}\"", kind, id);
                Ok(true)
            }
            None => {
                store.delete(id).await?;
                info!("  -> {} \"{}\" gone from source, deleted", kind, id);
                Ok(false)
            }
        }
    }

    /// The catalog discovered by the last `define_models`.
    pub async fn catalog(&self) -> Option<EntityCatalog> {
        self.state.lock().await.catalog.clone()
    }

    /// Kinds still waiting for their base collection.
    pub async fn unloaded_kinds(&self) -> Vec<String> {
        self.state.lock().await.unloaded.clone()
    }

    /// Whether a full sync has completed since models were last defined.
    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.loaded
    }

    /// Defines models, runs a full sync, then polls the change feed every
    /// `poll_interval` until `shutdown` resolves.
    ///
    /// Discovery failures end the run with an error. Kinds the full sync
    /// could not load are retried at each tick before the feed is polled.
    /// A failed poll is logged and retried on the next tick.
    pub async fn run<F>(&self, shutdown: F) -> SyncResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        self.define_models().await?;

        let report = self.full_sync().await?;
        if !report.is_clean() {
            warn!("Full sync left {} kinds unloaded", report.failures.len());
        }

        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Sync session for {} stopping", self.source.source_name());
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.retry_unloaded().await {
                        Ok(Some(report)) if !report.is_clean() => {
                            warn!("{} kinds still unloaded", report.failures.len());
                        }
                        Ok(_) => {}
                        Err(e) => error!("Retrying unloaded kinds failed: {}", e),
                    }
                    match self.sync_changes().await {
                        Ok(report) if !report.is_clean() => {
                            warn!("Change sync skipped {} records", report.failures.len());
                        }
                        Ok(_) => {}
                        Err(e) => error!("Change sync failed: {}", e),
                    }
                }
            }
        }
    }
}
