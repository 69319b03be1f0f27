use std::path::Path;

use common::storage::{FileStore, StorageError};
use common::transfer::{RemoteTransfer, TransferError, remote_join};
use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::events::ArtifactEvents;
use crate::catalog::{Catalog, CatalogError, NewArtifact};
use crate::entity::{asset, cache_node};

/// Result of copying one upload to one secondary cache node.
#[derive(Debug)]
pub enum ReplicaOutcome {
    Replicated {
        cache_id: i32,
        artifact: asset::Model,
    },
    Failed {
        cache_id: i32,
        error: String,
    },
}

impl ReplicaOutcome {
    pub fn cache_id(&self) -> i32 {
        match self {
            ReplicaOutcome::Replicated { cache_id, .. }
            | ReplicaOutcome::Failed { cache_id, .. } => *cache_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("cache node {0} does not exist")]
    MissingCacheNode(i32),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Copies uploads to secondary cache nodes and removes files from their owner.
pub struct ReplicationCoordinator<'a> {
    catalog: &'a dyn Catalog,
    store: &'a dyn FileStore,
    transfer: &'a dyn RemoteTransfer,
    events: &'a dyn ArtifactEvents,
    default_cache_id: i32,
}

impl<'a> ReplicationCoordinator<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        store: &'a dyn FileStore,
        transfer: &'a dyn RemoteTransfer,
        events: &'a dyn ArtifactEvents,
        default_cache_id: i32,
    ) -> Self {
        Self {
            catalog,
            store,
            transfer,
            events,
            default_cache_id,
        }
    }

    pub fn default_cache_id(&self) -> i32 {
        self.default_cache_id
    }

    /// Push `local` to every node except the default one, concurrently.
    ///
    /// Returns one outcome per attempted node once all attempts have finished.
    /// A node only gets a catalog record when its transfer succeeded.
    #[instrument(skip(self, local, base, nodes), fields(fd = %base.fd))]
    pub async fn replicate(
        &self,
        local: &Path,
        base: &NewArtifact,
        nodes: &[cache_node::Model],
    ) -> Vec<ReplicaOutcome> {
        let attempts = nodes
            .iter()
            .filter(|node| node.id != self.default_cache_id)
            .map(|node| self.replicate_to(local, base, node));

        join_all(attempts).await
    }

    async fn replicate_to(
        &self,
        local: &Path,
        base: &NewArtifact,
        node: &cache_node::Model,
    ) -> ReplicaOutcome {
        let target = node.transfer_target();
        let remote_path = remote_join(&node.ftp_path, &base.fd);

        if let Err(e) = self.transfer.put(local, &remote_path, &target).await {
            error!(
                cache_id = node.id,
                address = %target.address(),
                error = %e,
                "Replication transfer failed"
            );
            return ReplicaOutcome::Failed {
                cache_id: node.id,
                error: e.to_string(),
            };
        }

        match self.catalog.create_artifact(base.clone(), node.id).await {
            Ok(artifact) => {
                info!(cache_id = node.id, asset_id = %artifact.id, "Artifact replicated");
                self.events.notify_created(&artifact);
                ReplicaOutcome::Replicated {
                    cache_id: node.id,
                    artifact,
                }
            }
            Err(e) => {
                error!(
                    cache_id = node.id,
                    address = %target.address(),
                    error = %e,
                    "Replica transferred but its record could not be created"
                );
                ReplicaOutcome::Failed {
                    cache_id: node.id,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Delete an artifact's file from the node that owns it. Sibling copies
    /// on other nodes are untouched.
    #[instrument(
        skip(self, artifact),
        fields(asset_id = %artifact.id, cache_id = artifact.cache_id)
    )]
    pub async fn remove(&self, artifact: &asset::Model) -> Result<(), RemovalError> {
        if artifact.cache_id == self.default_cache_id {
            if !self.store.delete(&artifact.fd).await? {
                warn!(fd = %artifact.fd, "Local file was already missing");
            }
            return Ok(());
        }

        let node = self
            .catalog
            .find_cache_node(artifact.cache_id)
            .await?
            .ok_or(RemovalError::MissingCacheNode(artifact.cache_id))?;
        let remote_path = remote_join(&node.ftp_path, &artifact.fd);
        self.transfer
            .delete(&remote_path, &node.transfer_target())
            .await?;
        Ok(())
    }
}
