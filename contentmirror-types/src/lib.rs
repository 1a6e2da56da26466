//! Core type definitions for contentmirror.
//!
//! This crate defines the source-agnostic types shared by the schema mapper
//! and the sync engine:
//! - Entity identities (source-assigned strings) and pass identifiers (UUID v7)
//! - Entity instances as served by the content source
//! - Change feed records (create / update / delete)

mod change;
mod ids;
mod instance;

pub use change::{ChangeOperation, ChangeRecord};
pub use ids::{EntityId, PassId};
pub use instance::EntityInstance;
