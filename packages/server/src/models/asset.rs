use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::asset;
use crate::services::replication::ReplicaOutcome;

/// Response DTO for a single artifact record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AssetResponse {
    /// Artifact ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// Original upload filename.
    #[schema(example = "MyApp-1.4.0-full.nupkg")]
    pub name: String,
    /// Uppercase SHA-1 of the file; empty unless the filetype is digested.
    #[schema(example = "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED")]
    pub digest: String,
    #[schema(example = ".nupkg")]
    pub filetype: String,
    #[schema(example = "win32")]
    pub platform: String,
    /// Path relative to the owning node's storage root.
    pub fd: String,
    #[schema(example = 48213)]
    pub size: i64,
    /// Owning cache node.
    pub cache_id: i32,
    pub download_count: i64,
    pub version_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<asset::Model> for AssetResponse {
    fn from(model: asset::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            digest: model.digest,
            filetype: model.filetype,
            platform: model.platform,
            fd: model.fd,
            size: model.size,
            cache_id: model.cache_id,
            download_count: model.download_count,
            version_id: model.version_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssetListResponse {
    pub assets: Vec<AssetResponse>,
    pub total: u64,
}

impl From<Vec<asset::Model>> for AssetListResponse {
    fn from(models: Vec<asset::Model>) -> Self {
        let total = models.len() as u64;
        Self {
            assets: models.into_iter().map(AssetResponse::from).collect(),
            total,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaState {
    Replicated,
    Failed,
}

/// Outcome of copying an upload to one secondary cache node.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ReplicaStatus {
    pub cache_id: i32,
    pub status: ReplicaState,
    /// Record created on the node, when replication succeeded.
    pub asset_id: Option<String>,
    /// Failure description, when replication failed.
    pub error: Option<String>,
}

impl From<ReplicaOutcome> for ReplicaStatus {
    fn from(outcome: ReplicaOutcome) -> Self {
        match outcome {
            ReplicaOutcome::Replicated { cache_id, artifact } => Self {
                cache_id,
                status: ReplicaState::Replicated,
                asset_id: Some(artifact.id.to_string()),
                error: None,
            },
            ReplicaOutcome::Failed { cache_id, error } => Self {
                cache_id,
                status: ReplicaState::Failed,
                asset_id: None,
                error: Some(error),
            },
        }
    }
}

/// Response body of a successful upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// The record on the default cache node.
    pub asset: AssetResponse,
    /// One entry per secondary cache node.
    pub replicas: Vec<ReplicaStatus>,
    /// Why no replication was attempted, when the node list was unavailable.
    pub replication_error: Option<String>,
}
