use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::version;

#[derive(Serialize, utoipa::ToSchema)]
pub struct VersionResponse {
    pub id: i32,
    #[schema(example = "1.4.0")]
    pub name: String,
    #[schema(example = "stable")]
    pub channel: String,
    pub created_at: DateTime<Utc>,
}

impl From<version::Model> for VersionResponse {
    fn from(model: version::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            channel: model.channel,
            created_at: model.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateVersionRequest {
    /// Semantic version, optionally prefixed with `v`.
    #[schema(example = "1.4.0")]
    pub name: String,
    /// Defaults to "stable".
    #[schema(example = "beta")]
    pub channel: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VersionListQuery {
    /// Only list versions in this channel.
    pub channel: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VersionListResponse {
    pub versions: Vec<VersionResponse>,
    pub total: u64,
}
