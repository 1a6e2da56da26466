//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The source answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catalog or schema could not be fetched. Fatal to the session.
    #[error("discovery failed while fetching {stage}: {source}")]
    Discovery {
        stage: &'static str,
        #[source]
        source: Box<SyncError>,
    },

    /// The catalog document was fetched but does not describe usable kinds.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A record or collection named a kind with no defined store.
    #[error("unknown entity kind: {0}")]
    UnknownEntityKind(String),

    /// An instance or change payload had no usable `id`.
    #[error("{kind} payload has no id")]
    MissingId { kind: String },

    /// Target store rejected the call.
    #[error("storage error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Models have not been defined for this session yet.
    #[error("entity catalog not discovered; define models first")]
    NotDiscovered,

    /// Change sync was requested before the initial full sync finished.
    #[error("full sync has not completed for this session")]
    FullSyncRequired,
}

impl SyncError {
    /// Wraps an error raised during catalog discovery.
    pub fn discovery(stage: &'static str, source: SyncError) -> Self {
        Self::Discovery {
            stage,
            source: Box::new(source),
        }
    }

    /// Whether this error aborts the session rather than one item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Discovery { .. } | Self::InvalidCatalog(_) | Self::Config(_)
        )
    }
}
