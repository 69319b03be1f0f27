use serde::Serialize;

use crate::entity::cache_node;

/// A cache node as exposed over the API. FTP credentials are never included.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CacheNodeResponse {
    pub id: i32,
    #[schema(example = "eu-west")]
    pub name: String,
    pub host: String,
    pub port: Option<i32>,
    /// Public base URL downloads are redirected to.
    #[schema(example = "https://eu.releases.example.com")]
    pub http_url: Option<String>,
    pub external_ip: Option<String>,
    /// Whether this is the origin node that receives uploads.
    pub is_default: bool,
}

impl CacheNodeResponse {
    pub fn new(model: cache_node::Model, default_cache_id: i32) -> Self {
        Self {
            is_default: model.id == default_cache_id,
            id: model.id,
            name: model.name,
            host: model.host,
            port: model.port,
            http_url: model.http_url,
            external_ip: model.external_ip,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CacheNodeListResponse {
    pub caches: Vec<CacheNodeResponse>,
}
