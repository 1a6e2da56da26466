//! Change records from the source's change feed.
//!
//! A record names one entity kind and carries either the full instance
//! (create/update) or only its identity (delete). Records are consumed once
//! by the change sync driver and never stored.

use crate::{EntityId, EntityInstance};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The mutation a change record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl ChangeOperation {
    /// Create and update share one storage effect: an upsert by id.
    pub fn is_upsert(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }

    /// Past-tense verb used in sync logs ("created", "updated", "deleted").
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// One entry of the change feed.
///
/// Field names follow the feed's JSON shape:
/// `{"type": "update", "entityType": "PageEntity", "entity": {"id": "1", ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub operation: ChangeOperation,
    #[serde(rename = "entityType")]
    pub entity_kind: String,
    #[serde(rename = "entity")]
    pub payload: EntityInstance,
}

impl ChangeRecord {
    /// A create record carrying the full new instance.
    pub fn create(entity_kind: impl Into<String>, instance: EntityInstance) -> Self {
        Self {
            operation: ChangeOperation::Create,
            entity_kind: entity_kind.into(),
            payload: instance,
        }
    }

    /// An update record carrying the full updated instance.
    pub fn update(entity_kind: impl Into<String>, instance: EntityInstance) -> Self {
        Self {
            operation: ChangeOperation::Update,
            entity_kind: entity_kind.into(),
            payload: instance,
        }
    }

    /// A delete record; the payload holds only the id.
    pub fn delete(entity_kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            operation: ChangeOperation::Delete,
            entity_kind: entity_kind.into(),
            payload: EntityInstance::id_only(id),
        }
    }

    /// Identity of the affected instance, if the payload carries one.
    pub fn entity_id(&self) -> Option<EntityId> {
        self.payload.id()
    }
}
