use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogError};
use crate::config::CacheConfig;
use crate::entity::{asset, cache_node};

/// Upsert the configured cache nodes into the catalog.
///
/// Nodes present in the catalog but absent from the configuration are left
/// alone.
pub async fn seed_cache_nodes(
    catalog: &dyn Catalog,
    cache: &CacheConfig,
) -> Result<(), CatalogError> {
    for node in &cache.nodes {
        catalog.upsert_cache_node(cache_node::Model::from(node)).await?;
    }
    if !cache.nodes.is_empty() {
        info!("Seeded {} cache nodes", cache.nodes.len());
    }

    if catalog.find_cache_node(cache.default_cache_id).await?.is_none() {
        warn!(
            default_cache_id = cache.default_cache_id,
            "Default cache node is not in the catalog; downloads will fail until it is added"
        );
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Latest-artifact lookups filter by node and platform, newest first.
    let indexes = [
        Index::create()
            .if_not_exists()
            .name("idx_asset_cache_platform_created")
            .table(asset::Entity)
            .col(asset::Column::CacheId)
            .col(asset::Column::Platform)
            .col(asset::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_asset_version")
            .table(asset::Entity)
            .col(asset::Column::VersionId)
            .to_string(PostgresQueryBuilder),
    ];

    for stmt in indexes {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index exists: {stmt}"),
            Err(e) => warn!("Failed to create index: {}", e),
        }
    }

    Ok(())
}
