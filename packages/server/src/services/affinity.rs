use crate::catalog::{Catalog, CatalogError};

/// Maps a client to the cache node that should serve it.
pub struct CacheAffinityResolver<'a> {
    catalog: &'a dyn Catalog,
    default_cache_id: i32,
}

impl<'a> CacheAffinityResolver<'a> {
    pub fn new(catalog: &'a dyn Catalog, default_cache_id: i32) -> Self {
        Self {
            catalog,
            default_cache_id,
        }
    }

    /// Mapped cache id for `client_key`, or the default node when unmapped.
    pub async fn resolve(&self, client_key: &str) -> Result<i32, CatalogError> {
        if client_key.is_empty() {
            return Ok(self.default_cache_id);
        }
        Ok(self
            .catalog
            .cache_for_client(client_key)
            .await?
            .unwrap_or(self.default_cache_id))
    }
}
