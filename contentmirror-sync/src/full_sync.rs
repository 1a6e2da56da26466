//! Full sync driver: one complete load of every entity kind.

use crate::catalog::{EntityCatalog, EntityDescriptor};
use crate::error::{SyncError, SyncResult};
use crate::report::{KindLoad, PhaseReport, SyncPhase};
use crate::source::ContentSource;
use crate::store::StoreSet;
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

/// Loads every kind in `catalog` into its store.
///
/// Each kind is fetched once from its list endpoint and written with a
/// single bulk `create`. A kind that fails is reported and skipped; the
/// remaining kinds still load. Up to `concurrency` kinds run at once, and
/// the report keeps catalog order regardless.
pub async fn run_full_sync(
    source: &dyn ContentSource,
    catalog: &EntityCatalog,
    stores: &StoreSet,
    concurrency: usize,
) -> PhaseReport {
    load_kinds(source, catalog.descriptors().iter().collect(), stores, concurrency).await
}

/// Reloads only `kinds`, typically the failures of an earlier pass.
///
/// Same per-kind contract as [`run_full_sync`]; kinds missing from the
/// catalog are skipped.
pub async fn retry_kinds(
    source: &dyn ContentSource,
    catalog: &EntityCatalog,
    kinds: &[String],
    stores: &StoreSet,
    concurrency: usize,
) -> PhaseReport {
    let descriptors = catalog
        .descriptors()
        .iter()
        .filter(|d| kinds.contains(&d.name))
        .collect();
    load_kinds(source, descriptors, stores, concurrency).await
}

async fn load_kinds(
    source: &dyn ContentSource,
    descriptors: Vec<&EntityDescriptor>,
    stores: &StoreSet,
    concurrency: usize,
) -> PhaseReport {
    let mut report = PhaseReport::begin(SyncPhase::Full);
    info!(
        "Full sync {}: fetching {} entity kinds from {}",
        report.pass_id,
        descriptors.len(),
        source.source_name()
    );

    let outcomes: Vec<(&EntityDescriptor, SyncResult<usize>)> = stream::iter(descriptors)
        .map(|descriptor| async move { (descriptor, load_kind(source, descriptor, stores).await) })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .boxed()
        .await;

    for (descriptor, outcome) in outcomes {
        report.attempted += 1;
        match outcome {
            Ok(instances) => {
                report.applied += 1;
                report.loaded.push(KindLoad {
                    entity_kind: descriptor.name.clone(),
                    instances,
                });
            }
            Err(e) => {
                warn!("Full sync of {} failed: {}", descriptor.name, e);
                report.record_failure(&descriptor.name, None, None, e);
            }
        }
    }

    let report = report.finish();
    info!(
        "Full sync {} finished: {}/{} kinds, {} instances",
        report.pass_id,
        report.applied,
        report.attempted,
        report.instances_loaded()
    );
    report
}

/// Fetches one kind's collection and hands it to the store in one call.
async fn load_kind(
    source: &dyn ContentSource,
    descriptor: &EntityDescriptor,
    stores: &StoreSet,
) -> SyncResult<usize> {
    let instances = source.fetch_collection(descriptor).await?;
    let store = stores
        .get(&descriptor.name)
        .ok_or_else(|| SyncError::UnknownEntityKind(descriptor.name.clone()))?;

    let count = instances.len();
    store.create(instances).await?;
    info!("  -> {} ({})", descriptor.name, count);
    Ok(count)
}
