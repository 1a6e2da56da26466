//! Sync engine mirroring a content source into a typed model store.
//!
//! # Architecture
//!
//! The source is the only authority. The engine keeps no state of its own
//! beyond one session's catalog; everything mirrored lives in the target
//! store, reached through [`ModelStore`] handles.
//!
//! ## Components
//!
//! - **Source**: [`ContentSource`] abstracts the CMS API ([`HttpSource`] for
//!   a live one, [`source::mock::MockSource`] for tests)
//! - **Catalog**: [`EntityCatalog`] lists entity kinds, their endpoints and
//!   their declared attributes
//! - **Full sync**: [`run_full_sync`] loads every kind once; [`retry_kinds`]
//!   reloads the kinds a previous pass failed on
//! - **Change sync**: [`apply_changes`] applies a change feed batch in order
//! - **Session**: [`SyncSession`] runs the phases and serializes passes
//!
//! ## Sync Process
//!
//! 1. **Discovery**: fetch the entity map and schema document
//! 2. **Model definition**: map each kind's attributes to model fields and
//!    define one store per kind
//! 3. **Full sync**: fetch every collection and bulk-create it
//! 4. **Change sync**: poll the change feed; create/update upsert, delete
//!    removes
//!
//! # Example
//!
//! ```no_run
//! use contentmirror_sync::{MemoryStoreFactory, SyncConfig, SyncSession};
//! use std::sync::Arc;
//!
//! # async fn example() -> contentmirror_sync::SyncResult<()> {
//! let factory = Arc::new(MemoryStoreFactory::new());
//! let session = SyncSession::connect(SyncConfig::for_source("http://localhost:4848"), factory)?;
//!
//! session.define_models().await?;
//! let report = session.full_sync().await?;
//! println!("loaded {} instances", report.instances_loaded());
//!
//! let changes = session.sync_changes().await?;
//! println!("applied {}/{} changes", changes.applied, changes.attempted);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod change_sync;
mod config;
mod error;
pub mod full_sync;
pub mod http;
pub mod memory;
pub mod report;
mod session;
pub mod source;
pub mod store;

pub use catalog::{EntityCatalog, EntityDescriptor, ID_PLACEHOLDER};
pub use change_sync::{apply_change, apply_changes, apply_feed, sync_changes};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use full_sync::{retry_kinds, run_full_sync};
pub use http::HttpSource;
pub use memory::{MemoryStore, MemoryStoreFactory};
pub use report::{ItemFailure, KindLoad, PhaseReport, SyncPhase};
pub use session::SyncSession;
pub use source::ContentSource;
pub use store::{ModelStore, ModelStoreFactory, StoreSet};
