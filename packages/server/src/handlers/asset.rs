use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::{BoxReader, FileStore, StoredFile};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::models::asset::{AssetResponse, UploadResponse};
use crate::services::publish::Upload;
use crate::state::AppState;
use crate::utils::filename::{filetype_of, validate_flat_filename};

pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    // Multipart framing adds a little on top of the file itself.
    let limit = max_upload_size.saturating_add(1024 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Assets",
    operation_id = "uploadAsset",
    summary = "Upload a release asset",
    description = "Stores the file on the default cache node, then replicates it to every other \
        cache node. Multipart fields: `file` (exactly one), `version` (a name, or JSON text \
        `{\"name\": ...}`; `version[name]` is also accepted), `platform`, and an optional \
        `channel` used when the version does not exist yet. Replica failures are reported in \
        the body and do not fail the upload.",
    request_body(content_type = "multipart/form-data", description = "Asset file and metadata"),
    responses(
        (status = 201, description = "Asset stored", body = UploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 504, description = "Upload took too long (TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_asset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let ceiling = state.config.upload.timeout();
    let response = tokio::time::timeout(ceiling, receive_upload(&state, multipart))
        .await
        .map_err(|_| {
            warn!(timeout_secs = ceiling.as_secs(), "Upload timed out");
            AppError::Timeout
        })??;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn receive_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadResponse, AppError> {
    let mut form = UploadForm::default();
    let read = form.read(&mut multipart, state).await;

    let upload = match read.and_then(|()| form.validate()) {
        Ok(upload) => upload,
        Err(e) => {
            form.discard(&*state.store).await;
            return Err(e);
        }
    };

    let report = state.publisher().publish(upload).await?;

    Ok(UploadResponse {
        asset: report.origin.into(),
        replicas: report.replicas.into_iter().map(Into::into).collect(),
        replication_error: report.replication_error,
    })
}

/// The `version` field: a bare name, a JSON string, or a JSON object with a
/// string `name`.
#[derive(Deserialize)]
#[serde(untagged)]
enum VersionField {
    Name(String),
    Object { name: String },
}

fn parse_version_field(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let name = if trimmed.starts_with('{') || trimmed.starts_with('"') {
        match serde_json::from_str::<VersionField>(trimmed) {
            Ok(VersionField::Name(name)) | Ok(VersionField::Object { name }) => name,
            Err(_) => return Err(AppError::Validation("Invalid version provided.".into())),
        }
    } else {
        trimmed.to_string()
    };

    if name.trim().is_empty() {
        return Err(AppError::Validation("A version is required.".into()));
    }
    Ok(name.trim().to_string())
}

#[derive(Default)]
struct UploadForm {
    file: Option<(String, StoredFile)>,
    extra_files: usize,
    version: Option<String>,
    version_name: Option<String>,
    platform: Option<String>,
    channel: Option<String>,
}

impl UploadForm {
    async fn read(&mut self, multipart: &mut Multipart, state: &AppState) -> Result<(), AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "file" if self.file.is_some() => self.extra_files += 1,
                "file" => {
                    let filename = field
                        .file_name()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            AppError::Validation("File field must have a filename".into())
                        })?;
                    let filename = validate_flat_filename(&filename)
                        .map_err(|e| AppError::Validation(e.message().into()))?
                        .to_string();
                    let stored = stream_field_to_store(
                        field,
                        &*state.store,
                        &filetype_of(&filename),
                        state.config.storage.max_upload_size,
                    )
                    .await?;
                    self.file = Some((filename, stored));
                }
                "version" | "version[name]" | "platform" | "channel" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
                    match name.as_str() {
                        "version" => self.version = Some(text),
                        "version[name]" => self.version_name = Some(text),
                        "platform" => self.platform = Some(text),
                        _ => self.channel = Some(text),
                    }
                }
                _ => {} // Ignore unknown fields.
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<Upload, AppError> {
        let Some((filename, stored)) = &self.file else {
            return Err(AppError::Validation("No file was uploaded".into()));
        };
        if self.extra_files > 0 {
            return Err(AppError::Validation(
                "Exactly one file must be uploaded".into(),
            ));
        }

        let version = match (&self.version, &self.version_name) {
            (Some(raw), _) => parse_version_field(raw)?,
            (None, Some(name)) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return Err(AppError::Validation("A version is required.".into())),
        };

        let platform = self
            .platform
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("A platform is required.".into()))?;

        Ok(Upload {
            filename: filename.clone(),
            platform: platform.to_string(),
            version,
            channel: self.channel.clone(),
            stored: stored.clone(),
        })
    }

    async fn discard(&self, store: &dyn FileStore) {
        if let Some((_, stored)) = &self.file
            && let Err(e) = store.delete(&stored.fd).await
        {
            warn!(fd = %stored.fd, error = %e, "Failed to remove rejected upload");
        }
    }
}

/// Stream a multipart field to the store via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    store: &dyn FileStore,
    extension: &str,
    max_size: u64,
) -> Result<StoredFile, AppError> {
    let temp_path = std::env::temp_dir().join(format!("release-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(store.put_stream(extension, reader).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}

fn parse_asset_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::Validation("Invalid asset ID".into()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Assets",
    operation_id = "getAsset",
    summary = "Get one asset record",
    params(("id" = String, Path, description = "Asset ID (UUID)")),
    responses(
        (status = 200, description = "Asset record", body = AssetResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssetResponse>, AppError> {
    let id = parse_asset_id(&id)?;
    let artifact = state
        .catalog
        .find_artifact(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found".into()))?;

    Ok(Json(artifact.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Assets",
    operation_id = "deleteAsset",
    summary = "Delete an asset record and its file",
    description = "Removes this one record and deletes its file from the cache node that owns \
        it. Copies of the same upload on other nodes are not touched.",
    params(("id" = String, Path, description = "Asset ID (UUID)")),
    responses(
        (status = 200, description = "Asset deleted", body = AssetResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Owning node unreachable (TRANSFER_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssetResponse>, AppError> {
    let id = parse_asset_id(&id)?;
    let artifact = state
        .publisher()
        .retract(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found".into()))?;

    Ok(Json(artifact.into()))
}
