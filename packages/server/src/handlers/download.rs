use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use common::storage::StoredReader;
use futures::Stream;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entity::asset;
use crate::error::AppError;
use crate::extractors::client_key::ClientKey;
use crate::services::affinity::CacheAffinityResolver;
use crate::services::counter::DownloadCounter;
use crate::services::dispatcher::Dispatch;
use crate::services::selector::{ArtifactSelector, SelectionCriteria, SelectionRequest};
use crate::state::AppState;

/// Path parameters shared by every download route. Absent segments stay `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DownloadPath {
    pub version: Option<String>,
    pub channel: Option<String>,
    pub platform: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub filetype: Option<String>,
}

/// `GET /download/latest`
pub async fn download_latest(
    State(state): State<AppState>,
    client: ClientKey,
    headers: HeaderMap,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    serve_download(&state, client, &headers, DownloadPath::default(), query).await
}

/// Every other download route.
pub async fn download(
    State(state): State<AppState>,
    client: ClientKey,
    headers: HeaderMap,
    Path(path): Path<DownloadPath>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    serve_download(&state, client, &headers, path, query).await
}

#[instrument(skip(state, headers), fields(client = %client.0))]
async fn serve_download(
    state: &AppState,
    client: ClientKey,
    headers: &HeaderMap,
    path: DownloadPath,
    query: DownloadQuery,
) -> Result<Response, AppError> {
    let cache_id = CacheAffinityResolver::new(&*state.catalog, state.default_cache_id())
        .resolve(&client.0)
        .await?;

    let request = SelectionRequest {
        platform: path.platform,
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        filetype: query.filetype,
        filename: path.filename,
        version: path.version,
        channel: path.channel,
    };
    let default_channel = state.config.download.default_channel();
    let criteria = SelectionCriteria::from_request(&request, cache_id, default_channel)?;
    let artifact = ArtifactSelector::new(&*state.catalog)
        .select(&criteria)
        .await?;
    debug!(asset_id = %artifact.id, cache_id, "Artifact selected");

    match state.dispatcher().dispatch(artifact).await? {
        Dispatch::Redirect { url } => redirect(&url),
        Dispatch::Stream { file, artifact } => stream_file(file, &artifact, state.counter.clone()),
    }
}

/// `302 Found` to the owning node.
fn redirect(url: &str) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, url)
        .body(Body::empty())
        .map_err(|e| AppError::Internal(format!("Failed to build redirect: {e}")))
}

fn stream_file(
    file: StoredReader,
    artifact: &asset::Model,
    counter: DownloadCounter,
) -> Result<Response, AppError> {
    let stream = CountOnComplete::new(ReaderStream::new(file.reader), counter, artifact.id);
    let content_type = mime_guess::from_path(&artifact.name)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&artifact.name),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Records the download once the wrapped body stream has ended cleanly.
struct CountOnComplete<S> {
    inner: S,
    pending: Option<(DownloadCounter, Uuid)>,
}

impl<S> CountOnComplete<S> {
    fn new(inner: S, counter: DownloadCounter, asset_id: Uuid) -> Self {
        Self {
            inner,
            pending: Some((counter, asset_id)),
        }
    }
}

impl<S, T, E> Stream for CountOnComplete<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    type Item = Result<T, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        match &polled {
            Poll::Ready(None) => {
                if let Some((counter, asset_id)) = self.pending.take() {
                    counter.record(asset_id);
                }
            }
            Poll::Ready(Some(Err(_))) => self.pending = None,
            _ => {}
        }
        polled
    }
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.trim().is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    format!("attachment; filename=\"{ascii_name}\"")
}
