//! Per-pass sync reports.
//!
//! A pass that cannot run at all surfaces as an `Err`. A pass that ran
//! returns a [`PhaseReport`] whose `failures` list the items that did not
//! make it into the store.

use chrono::{DateTime, Utc};
use contentmirror_types::{EntityId, PassId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which driver produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Full,
    Changes,
}

/// One item that failed within an otherwise completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub entity_kind: String,
    /// Position of the change record in its batch (change passes only).
    pub position: Option<usize>,
    pub entity_id: Option<EntityId>,
    pub error: String,
}

/// Instances loaded for one kind during a full sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindLoad {
    pub entity_kind: String,
    pub instances: usize,
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub pass_id: PassId,
    pub phase: SyncPhase,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Kinds (full sync) or records (change sync) attempted.
    pub attempted: usize,
    /// Kinds or records that reached the store.
    pub applied: usize,
    /// Per-kind load counts, in catalog order (full sync only).
    pub loaded: Vec<KindLoad>,
    pub failures: Vec<ItemFailure>,
}

impl PhaseReport {
    /// Starts a report for a new pass.
    pub fn begin(phase: SyncPhase) -> Self {
        Self {
            pass_id: PassId::new(),
            phase,
            started_at: Utc::now(),
            finished_at: None,
            attempted: 0,
            applied: 0,
            loaded: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Stamps the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub(crate) fn record_failure(
        &mut self,
        entity_kind: impl Into<String>,
        position: Option<usize>,
        entity_id: Option<EntityId>,
        error: impl ToString,
    ) {
        self.failures.push(ItemFailure {
            entity_kind: entity_kind.into(),
            position,
            entity_id,
            error: error.to_string(),
        });
    }

    /// True when every attempted item was applied.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Kinds with at least one failure, in first-failure order.
    pub fn failed_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = Vec::new();
        for failure in &self.failures {
            if !kinds.contains(&failure.entity_kind) {
                kinds.push(failure.entity_kind.clone());
            }
        }
        kinds
    }

    /// Total instances loaded across kinds (full sync only).
    pub fn instances_loaded(&self) -> usize {
        self.loaded.iter().map(|k| k.instances).sum()
    }

    /// Wall time of the pass, once finished.
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
    }
}
