use axum::Json;
use axum::extract::State;

use crate::error::AppError;
use crate::models::cache::{CacheNodeListResponse, CacheNodeResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Caches",
    operation_id = "listCaches",
    summary = "List cache nodes",
    description = "FTP credentials are omitted.",
    responses(
        (status = 200, description = "Cache node list", body = CacheNodeListResponse),
    ),
)]
pub async fn list_caches(
    State(state): State<AppState>,
) -> Result<Json<CacheNodeListResponse>, AppError> {
    let default_cache_id = state.default_cache_id();
    let caches = state
        .catalog
        .list_cache_nodes()
        .await?
        .into_iter()
        .map(|node| CacheNodeResponse::new(node, default_cache_id))
        .collect();

    Ok(Json(CacheNodeListResponse { caches }))
}
