use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::LocalFileStore;
use common::transfer::FtpTransferClient;
use tracing::{Level, info};

use release_server::catalog::DbCatalog;
use release_server::config::AppConfig;
use release_server::services::counter::DownloadCounter;
use release_server::services::events::NoopEvents;
use release_server::state::AppState;
use release_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    seed::ensure_indexes(&db).await?;

    let catalog = Arc::new(DbCatalog::new(db));
    seed::seed_cache_nodes(catalog.as_ref(), &config.cache).await?;

    let store = LocalFileStore::new(
        config.storage.root.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize asset storage")?;
    info!(root = %config.storage.root.display(), "Asset storage ready");

    let (counter, _counter_worker) = DownloadCounter::spawn(catalog.clone());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        config: Arc::new(config),
        catalog,
        store: Arc::new(store),
        transfer: Arc::new(FtpTransferClient::new()),
        events: Arc::new(NoopEvents),
        counter,
    };

    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
