//! Narrow persistence interface used by the asset services.

mod db;

pub use db::DbCatalog;

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::{asset, cache_node, version};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog query failed: {0}")]
    Query(String),
    #[error("{0}")]
    Conflict(String),
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        CatalogError::Query(err.to_string())
    }
}

/// Constraints applied when looking up artifacts. Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactFilter {
    pub platforms: Vec<String>,
    pub filetype: Option<String>,
    pub cache_id: Option<i32>,
}

impl ArtifactFilter {
    pub fn matches(&self, artifact: &asset::Model) -> bool {
        (self.platforms.is_empty() || self.platforms.contains(&artifact.platform))
            && self
                .filetype
                .as_ref()
                .is_none_or(|ft| *ft == artifact.filetype)
            && self.cache_id.is_none_or(|id| id == artifact.cache_id)
    }
}

/// Fields of an artifact record, minus the owner node and generated columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    pub name: String,
    pub digest: String,
    pub filetype: String,
    pub platform: String,
    pub fd: String,
    pub size: i64,
    pub version_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub name: String,
    pub channel: String,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Cache node assigned to a client, if any.
    async fn cache_for_client(&self, client_key: &str) -> Result<Option<i32>, CatalogError>;

    /// Most recently created version matching the supplied fields.
    async fn latest_version(
        &self,
        name: Option<&str>,
        channel: Option<&str>,
    ) -> Result<Option<version::Model>, CatalogError>;

    async fn find_version_by_name(&self, name: &str)
    -> Result<Option<version::Model>, CatalogError>;

    /// Fails with `CatalogError::Conflict` if the name is taken.
    async fn create_version(&self, new: NewVersion) -> Result<version::Model, CatalogError>;

    /// Versions newest first, optionally limited to one channel.
    async fn list_versions(
        &self,
        channel: Option<&str>,
    ) -> Result<Vec<version::Model>, CatalogError>;

    async fn version_artifacts(
        &self,
        version_id: i32,
        filter: &ArtifactFilter,
    ) -> Result<Vec<asset::Model>, CatalogError>;

    /// Most recently created artifact matching the filter.
    async fn latest_artifact(
        &self,
        filter: &ArtifactFilter,
    ) -> Result<Option<asset::Model>, CatalogError>;

    async fn find_artifact(&self, id: Uuid) -> Result<Option<asset::Model>, CatalogError>;

    async fn create_artifact(
        &self,
        new: NewArtifact,
        cache_id: i32,
    ) -> Result<asset::Model, CatalogError>;

    /// Returns `false` if no record had this id.
    async fn delete_artifact(&self, id: Uuid) -> Result<bool, CatalogError>;

    /// Atomically add one to the artifact's download counter.
    async fn increment_download_count(&self, id: Uuid) -> Result<(), CatalogError>;

    async fn find_cache_node(&self, id: i32) -> Result<Option<cache_node::Model>, CatalogError>;

    async fn list_cache_nodes(&self) -> Result<Vec<cache_node::Model>, CatalogError>;

    async fn upsert_cache_node(&self, node: cache_node::Model) -> Result<(), CatalogError>;
}
