mod common;

use async_trait::async_trait;
use common::{cms_source, PAGE, USER};
use contentmirror_sync::{
    run_full_sync, EntityCatalog, MemoryStoreFactory, ModelStore, StoreSet, SyncPhase, SyncResult,
    SyncError,
};
use contentmirror_types::{EntityId, EntityInstance};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn prepare(
    source: &contentmirror_sync::source::mock::MockSource,
) -> (EntityCatalog, StoreSet, MemoryStoreFactory) {
    let catalog = EntityCatalog::discover(source, "Schema_").await.unwrap();
    let factory = MemoryStoreFactory::new();
    let stores = StoreSet::define_all(&catalog.models(), &factory).await.unwrap();
    (catalog, stores, factory)
}

/// A store that refuses every write.
struct BrokenStore(&'static str);

#[async_trait]
impl ModelStore for BrokenStore {
    fn kind(&self) -> &str {
        self.0
    }

    async fn create(&self, _instances: Vec<EntityInstance>) -> SyncResult<()> {
        Err(SyncError::Store("disk full".into()))
    }

    async fn delete(&self, _id: &EntityId) -> SyncResult<()> {
        Err(SyncError::Store("disk full".into()))
    }
}

#[tokio::test]
async fn loads_every_kind_once() {
    common::init_tracing();
    let source = cms_source();
    let (catalog, stores, factory) = prepare(&source).await;

    let report = run_full_sync(&source, &catalog, &stores, 1).await;

    assert_eq!(report.phase, SyncPhase::Full);
    assert!(report.is_clean());
    assert_eq!(report.attempted, 2);
    assert_eq!(report.applied, 2);
    assert_eq!(report.instances_loaded(), 7);
    assert!(report.finished_at.is_some());

    assert_eq!(source.list_fetches(), vec![USER.to_string(), PAGE.to_string()]);

    let pages = factory.store(PAGE).await.unwrap();
    assert_eq!(pages.len().await, 6);
    assert_eq!(pages.create_calls(), 1);
    assert_eq!(
        pages.get("1").await.unwrap().get_str("/title"),
        Some("Hello world")
    );
    assert_eq!(factory.store(USER).await.unwrap().create_calls(), 1);
}

#[tokio::test]
async fn failing_kind_does_not_stop_the_others() {
    let source = cms_source();
    source.fail_kind(USER);
    let (catalog, stores, factory) = prepare(&source).await;

    let report = run_full_sync(&source, &catalog, &stores, 1).await;

    assert_eq!(report.attempted, 2);
    assert_eq!(report.applied, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].entity_kind, USER);
    assert_eq!(source.list_fetches().len(), 2);

    assert!(factory.store(USER).await.unwrap().is_empty().await);
    assert_eq!(factory.store(PAGE).await.unwrap().len().await, 6);
}

#[tokio::test]
async fn kind_without_store_is_fetched_then_reported() {
    let source = cms_source();
    let catalog = EntityCatalog::discover(&source, "Schema_").await.unwrap();
    let factory = MemoryStoreFactory::new();
    let stores = StoreSet::define_all(&[catalog.model_for(PAGE)], &factory)
        .await
        .unwrap();

    let report = run_full_sync(&source, &catalog, &stores, 1).await;

    assert_eq!(source.list_fetches().len(), 2);
    assert_eq!(report.applied, 1);
    assert!(report.failures[0].error.contains("unknown entity kind"));
}

#[tokio::test]
async fn store_rejection_is_reported_per_kind() {
    let source = cms_source();
    let (catalog, mut stores, factory) = prepare(&source).await;
    stores.insert(USER, Arc::new(BrokenStore(USER)));

    let report = run_full_sync(&source, &catalog, &stores, 1).await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.failures[0].entity_kind, USER);
    assert!(report.failures[0].error.contains("disk full"));
    assert_eq!(factory.store(PAGE).await.unwrap().len().await, 6);
}

#[tokio::test]
async fn concurrent_load_keeps_catalog_order() {
    let source = cms_source();
    let (catalog, stores, _factory) = prepare(&source).await;

    let report = run_full_sync(&source, &catalog, &stores, 4).await;

    let order: Vec<&str> = report.loaded.iter().map(|k| k.entity_kind.as_str()).collect();
    assert_eq!(order, vec![USER, PAGE]);
    assert_eq!(report.loaded[1].instances, 6);
    assert_eq!(source.list_fetches().len(), 2);
}

#[tokio::test]
async fn rerun_overwrites_by_id() {
    let source = cms_source();
    let (catalog, stores, factory) = prepare(&source).await;
    run_full_sync(&source, &catalog, &stores, 1).await;

    source.set_collection(PAGE, vec![common::page("1", "Edited")]);
    let report = run_full_sync(&source, &catalog, &stores, 1).await;

    assert!(report.is_clean());
    let pages = factory.store(PAGE).await.unwrap();
    assert_eq!(pages.len().await, 6);
    assert_eq!(pages.get("1").await.unwrap().get_str("/title"), Some("Edited"));
}

#[tokio::test]
async fn empty_catalog_fetches_nothing() {
    let source = contentmirror_sync::source::mock::MockSource::new();
    let (catalog, stores, _factory) = prepare(&source).await;

    let report = run_full_sync(&source, &catalog, &stores, 1).await;

    assert_eq!(report.attempted, 0);
    assert!(report.is_clean());
    assert!(source.list_fetches().is_empty());
}

#[tokio::test]
async fn retry_kinds_reloads_only_the_failed_kinds() {
    let source = cms_source();
    source.fail_kind(USER);
    let (catalog, stores, factory) = prepare(&source).await;

    let first = run_full_sync(&source, &catalog, &stores, 1).await;
    assert_eq!(first.failed_kinds(), vec![USER.to_string()]);

    source.restore_kind(USER);
    let retry = contentmirror_sync::retry_kinds(
        &source,
        &catalog,
        &first.failed_kinds(),
        &stores,
        1,
    )
    .await;

    assert!(retry.is_clean());
    assert_eq!(retry.attempted, 1);
    assert_eq!(retry.loaded[0].entity_kind, USER);
    assert_eq!(
        source.list_fetches(),
        vec![USER.to_string(), PAGE.to_string(), USER.to_string()]
    );
    assert_eq!(factory.store(USER).await.unwrap().len().await, 1);
    assert_eq!(factory.store(PAGE).await.unwrap().create_calls(), 1);
}

#[tokio::test]
async fn retry_kinds_skips_kinds_outside_the_catalog() {
    let source = cms_source();
    let (catalog, stores, _factory) = prepare(&source).await;

    let report = contentmirror_sync::retry_kinds(
        &source,
        &catalog,
        &["CommentEntity".to_string()],
        &stores,
        1,
    )
    .await;

    assert_eq!(report.attempted, 0);
    assert!(source.list_fetches().is_empty());
}
