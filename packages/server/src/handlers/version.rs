use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, instrument};

use crate::catalog::{ArtifactFilter, NewVersion};
use crate::entity::version::DEFAULT_CHANNEL;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::asset::AssetListResponse;
use crate::models::version::{
    CreateVersionRequest, VersionListQuery, VersionListResponse, VersionResponse,
};
use crate::state::AppState;
use crate::utils::version::{compare_version_names_desc, parse_version_name};

#[utoipa::path(
    get,
    path = "/",
    tag = "Versions",
    operation_id = "listVersions",
    summary = "List versions",
    description = "Versions ordered by semantic version, newest first.",
    params(VersionListQuery),
    responses(
        (status = 200, description = "Version list", body = VersionListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_versions(
    State(state): State<AppState>,
    Query(query): Query<VersionListQuery>,
) -> Result<Json<VersionListResponse>, AppError> {
    let channel = query.channel.as_deref().filter(|c| !c.is_empty());
    let mut versions = state.catalog.list_versions(channel).await?;
    versions.sort_by(|a, b| compare_version_names_desc(&a.name, &b.name));

    let total = versions.len() as u64;
    Ok(Json(VersionListResponse {
        versions: versions.into_iter().map(VersionResponse::from).collect(),
        total,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Versions",
    operation_id = "createVersion",
    summary = "Create a version",
    request_body = CreateVersionRequest,
    responses(
        (status = 201, description = "Version created", body = VersionResponse),
        (status = 400, description = "Not a semantic version (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Name already exists (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_version(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateVersionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim().to_string();
    parse_version_name(&name).map_err(|e| {
        AppError::Validation(format!("Invalid version name '{name}': {e}"))
    })?;
    let channel = payload
        .channel
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

    let created = state
        .catalog
        .create_version(NewVersion { name, channel })
        .await?;
    info!(version = %created.name, channel = %created.channel, "Version created");

    Ok((StatusCode::CREATED, Json(VersionResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/{name}/assets",
    tag = "Versions",
    operation_id = "listVersionAssets",
    summary = "List every asset record of a version",
    description = "Includes the copies on every cache node.",
    params(("name" = String, Path, description = "Version name")),
    responses(
        (status = 200, description = "Asset list", body = AssetListResponse),
        (status = 404, description = "Version not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_version_assets(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AssetListResponse>, AppError> {
    let version = state
        .catalog
        .find_version_by_name(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Version '{name}' not found")))?;

    let assets = state
        .catalog
        .version_artifacts(version.id, &ArtifactFilter::default())
        .await?;

    Ok(Json(assets.into()))
}
