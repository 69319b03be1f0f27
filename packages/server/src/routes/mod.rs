mod v1;

use axum::Router;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes(config))
}

/// Public download routes used by installers and update clients.
pub fn download_routes() -> Router<AppState> {
    use handlers::download::{download, download_latest};

    Router::new()
        .route("/latest", get(download_latest))
        .route("/latest/{platform}", get(download))
        .route("/channel/{channel}", get(download))
        .route("/channel/{channel}/{platform}", get(download))
        .route("/{version}", get(download))
        .route("/{version}/{platform}", get(download))
        .route("/{version}/{platform}/{filename}", get(download))
}
