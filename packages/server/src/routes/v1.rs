use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/assets", asset_routes(config))
        .nest("/versions", version_routes())
        .nest("/caches", cache_routes())
}

fn asset_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::asset::upload_asset))
        .routes(routes!(
            handlers::asset::get_asset,
            handlers::asset::delete_asset
        ))
        .layer(handlers::asset::upload_body_limit(
            config.storage.max_upload_size,
        ))
}

fn version_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::version::list_versions,
            handlers::version::create_version
        ))
        .routes(routes!(handlers::version::list_version_assets))
}

fn cache_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::cache::list_caches))
}
