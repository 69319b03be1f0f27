use common::storage::{FileStore, StorageError, StoredReader};
use thiserror::Error;
use tracing::error;

use super::counter::DownloadCounter;
use crate::catalog::{Catalog, CatalogError};
use crate::entity::asset;

/// How a resolved artifact reaches the client.
#[derive(Debug)]
pub enum Dispatch {
    /// Send the opened local file. The download is recorded once the body is complete.
    Stream {
        file: StoredReader,
        artifact: asset::Model,
    },
    /// Send the client to the owning node. Already recorded.
    Redirect { url: String },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("cache node {0} does not exist")]
    MissingCacheNode(i32),
    #[error("cache node {0} has no public URL")]
    NoPublicUrl(i32),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct DownloadDispatcher<'a> {
    catalog: &'a dyn Catalog,
    store: &'a dyn FileStore,
    counter: &'a DownloadCounter,
    default_cache_id: i32,
}

impl<'a> DownloadDispatcher<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        store: &'a dyn FileStore,
        counter: &'a DownloadCounter,
        default_cache_id: i32,
    ) -> Self {
        Self {
            catalog,
            store,
            counter,
            default_cache_id,
        }
    }

    /// Stream from the default node when it has no public URL, redirect otherwise.
    pub async fn dispatch(&self, artifact: asset::Model) -> Result<Dispatch, DispatchError> {
        let node = self
            .catalog
            .find_cache_node(artifact.cache_id)
            .await?
            .ok_or(DispatchError::MissingCacheNode(artifact.cache_id))?;

        let public_url = node.http_url.as_deref().filter(|url| !url.is_empty());
        match public_url {
            None if node.id == self.default_cache_id => {
                let path = self.store.path_of(&artifact.fd)?;
                let file = self.store.get_stream(&artifact.fd).await.inspect_err(|e| {
                    error!(path = %path.display(), error = %e, "Failed to open local file");
                })?;
                Ok(Dispatch::Stream { file, artifact })
            }
            None => Err(DispatchError::NoPublicUrl(node.id)),
            Some(base) => {
                let url = join_url(base, &artifact.fd);
                self.counter.record(artifact.id);
                Ok(Dispatch::Redirect { url })
            }
        }
    }
}

/// Join a base URL and a relative path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
