//! Change sync driver: applies a change feed batch to the target store.
//!
//! Records are applied strictly in the order received, one store call per
//! record, so repeated writes to the same id resolve to the last one.

use crate::error::{SyncError, SyncResult};
use crate::report::{PhaseReport, SyncPhase};
use crate::source::ContentSource;
use crate::store::StoreSet;
use contentmirror_types::{ChangeRecord, EntityId, EntityInstance};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A feed element that did not decode into a [`ChangeRecord`].
struct Rejected {
    entity_kind: String,
    entity_id: Option<EntityId>,
    error: SyncError,
}

/// Fetches one batch from the change feed and applies it.
///
/// Failing to fetch the batch is an error; failures of individual records,
/// including records that do not decode, are collected in the report.
pub async fn sync_changes(
    source: &dyn ContentSource,
    stores: &StoreSet,
) -> SyncResult<PhaseReport> {
    info!("Fetching changes from {}", source.source_name());
    let batch = source.fetch_changes().await?;
    Ok(apply_feed(batch, stores).await)
}

/// Decodes and applies raw feed elements in order.
///
/// An element that is not a valid change record fails at its position;
/// the elements around it still apply.
pub async fn apply_feed(batch: Vec<Value>, stores: &StoreSet) -> PhaseReport {
    apply_entries(batch.into_iter().map(decode), stores).await
}

/// Applies `changes` in order.
///
/// A record naming a kind without a store, or carrying no id, fails on its
/// own; the rest of the batch still applies.
pub async fn apply_changes(changes: Vec<ChangeRecord>, stores: &StoreSet) -> PhaseReport {
    apply_entries(changes.into_iter().map(Ok), stores).await
}

async fn apply_entries<I>(entries: I, stores: &StoreSet) -> PhaseReport
where
    I: IntoIterator<Item = Result<ChangeRecord, Rejected>>,
{
    let mut report = PhaseReport::begin(SyncPhase::Changes);

    for (position, entry) in entries.into_iter().enumerate() {
        report.attempted += 1;

        let change = match entry {
            Ok(change) => change,
            Err(rejected) => {
                warn!(
                    "Change #{} for {} not decoded: {}",
                    position, rejected.entity_kind, rejected.error
                );
                report.record_failure(
                    rejected.entity_kind,
                    Some(position),
                    rejected.entity_id,
                    rejected.error,
                );
                continue;
            }
        };

        let kind = change.entity_kind.clone();
        let entity_id = change.entity_id();
        match apply_change(change, stores).await {
            Ok(()) => report.applied += 1,
            Err(e) => {
                warn!("Change #{} for {} not applied: {}", position, kind, e);
                report.record_failure(kind, Some(position), entity_id, e);
            }
        }
    }

    let report = report.finish();
    debug!("Change sync {}: {} records", report.pass_id, report.attempted);
    info!(
        "Change sync {} finished: {}/{} records applied",
        report.pass_id, report.applied, report.attempted
    );
    report
}

/// Decodes one feed element, keeping whatever kind and id it names for the
/// failure report.
fn decode(raw: Value) -> Result<ChangeRecord, Rejected> {
    let entity_kind = raw
        .get("entityType")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let entity_id = raw
        .get("entity")
        .cloned()
        .and_then(EntityInstance::from_value)
        .and_then(|entity| entity.id());

    serde_json::from_value(raw).map_err(|e| Rejected {
        entity_kind,
        entity_id,
        error: e.into(),
    })
}

/// Applies a single record: create and update upsert, delete removes.
pub async fn apply_change(change: ChangeRecord, stores: &StoreSet) -> SyncResult<()> {
    let store = stores
        .get(&change.entity_kind)
        .ok_or_else(|| SyncError::UnknownEntityKind(change.entity_kind.clone()))?;
    let id = change.entity_id().ok_or_else(|| SyncError::MissingId {
        kind: change.entity_kind.clone(),
    })?;

    let operation = change.operation;
    if operation.is_upsert() {
        store.create(vec![change.payload]).await?;
    } else {
        store.delete(&id).await?;
    }

    info!(
        "  -> {} {} \"{}\"",
        operation.past_tense(),
        change.entity_kind,
        id
    );
    Ok(())
}
