//! Sync configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a sync session against one content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the content source (e.g. `http://localhost:4848`).
    pub api_base_url: String,
    /// Path of the entity map (kind → single/list endpoints).
    pub entity_map_path: String,
    /// Path of the dereferenced schema document.
    pub schema_path: String,
    /// Path of the change feed.
    pub changes_path: String,
    /// Prefix of per-kind definitions in the schema document.
    pub schema_prefix: String,
    /// Timeout for a single source request (seconds).
    pub request_timeout_secs: u64,
    /// How often the session polls the change feed (seconds).
    pub poll_interval_secs: u64,
    /// How many entity kinds a full sync may load at once.
    pub full_sync_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4848".to_string(),
            entity_map_path: "/entity-map/".to_string(),
            schema_path: "/documentation_transformed/json".to_string(),
            changes_path: "/changed-entities".to_string(),
            schema_prefix: "Schema_".to_string(),
            request_timeout_secs: 30,
            poll_interval_secs: 30,
            full_sync_concurrency: 1,
        }
    }
}

impl SyncConfig {
    /// Config pointing at `api_base_url` with everything else defaulted.
    pub fn for_source(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    /// Loads a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(SyncError::Config("api_base_url is empty".into()));
        }
        if self.full_sync_concurrency == 0 {
            return Err(SyncError::Config("full_sync_concurrency must be at least 1".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(SyncError::Config("poll_interval_secs must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SyncError::Config("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Resolves a source path against the base URL. Absolute URLs pass
    /// through unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.api_base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
