//! HTTP content source.
//!
//! Talks to the CMS over plain JSON GETs: entity map, schema document,
//! list/single endpoints per kind, and the change feed.

use crate::catalog::EntityDescriptor;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::source::ContentSource;
use async_trait::async_trait;
use contentmirror_types::{EntityId, EntityInstance};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A content source reached over HTTP.
pub struct HttpSource {
    config: SyncConfig,
    client: Client,
}

impl HttpSource {
    /// Creates a client for the source at `config.api_base_url`.
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// GETs `path` and decodes the body. `Ok(None)` on 404.
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> SyncResult<Option<T>> {
        let url = self.config.url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("reading {url} failed: {e}")))?;

        Ok(Some(serde_json::from_str(&body)?))
    }

    /// GETs `path` and decodes the body; 404 is an error.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> SyncResult<T> {
        self.get_optional(path)
            .await?
            .ok_or_else(|| SyncError::Http {
                status: StatusCode::NOT_FOUND.as_u16(),
                url: self.config.url(path),
            })
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    fn source_name(&self) -> &str {
        &self.config.api_base_url
    }

    async fn fetch_entity_map(&self) -> SyncResult<Vec<EntityDescriptor>> {
        self.get(&self.config.entity_map_path).await
    }

    async fn fetch_schema(&self) -> SyncResult<Value> {
        self.get(&self.config.schema_path).await
    }

    async fn fetch_collection(
        &self,
        descriptor: &EntityDescriptor,
    ) -> SyncResult<Vec<EntityInstance>> {
        self.get(&descriptor.list_path).await
    }

    async fn fetch_single(
        &self,
        descriptor: &EntityDescriptor,
        id: &EntityId,
    ) -> SyncResult<Option<EntityInstance>> {
        self.get_optional(&descriptor.single_path_for(id)).await
    }

    async fn fetch_changes(&self) -> SyncResult<Vec<Value>> {
        self.get(&self.config.changes_path).await
    }
}
