//! Upload and deletion flows for artifacts.

use common::storage::{ContentDigest, FileStore, StorageError, StoredFile};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::events::ArtifactEvents;
use super::replication::{RemovalError, ReplicaOutcome, ReplicationCoordinator};
use crate::catalog::{Catalog, CatalogError, NewArtifact, NewVersion};
use crate::entity::{asset, version};
use crate::utils::filename::filetype_of;
use crate::utils::platform;
use crate::utils::version::parse_version_name;

/// A file already written to the local store, with its upload metadata.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub platform: String,
    pub version: String,
    pub channel: Option<String>,
    pub stored: StoredFile,
}

#[derive(Debug)]
pub struct PublishReport {
    pub origin: asset::Model,
    pub replicas: Vec<ReplicaOutcome>,
    /// Set when replication could not start at all.
    pub replication_error: Option<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid version name '{0}': expected a semantic version")]
    InvalidVersion(String),
    #[error("Unparseable platform '{0}'")]
    InvalidPlatform(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct Publisher<'a> {
    catalog: &'a dyn Catalog,
    store: &'a dyn FileStore,
    events: &'a dyn ArtifactEvents,
    coordinator: ReplicationCoordinator<'a>,
    digest_filetype: &'a str,
}

impl<'a> Publisher<'a> {
    pub fn new(
        catalog: &'a dyn Catalog,
        store: &'a dyn FileStore,
        events: &'a dyn ArtifactEvents,
        coordinator: ReplicationCoordinator<'a>,
        digest_filetype: &'a str,
    ) -> Self {
        Self {
            catalog,
            store,
            events,
            coordinator,
            digest_filetype,
        }
    }

    /// Record an upload on the default node, then replicate it.
    ///
    /// If anything fails before the origin record exists the stored file is
    /// removed again. Replica failures never fail the upload.
    pub async fn publish(&self, upload: Upload) -> Result<PublishReport, PublishError> {
        let fd = upload.stored.fd.clone();
        let (origin, base) = match self.record_origin(upload).await {
            Ok(recorded) => recorded,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&fd).await {
                    warn!(%fd, error = %cleanup, "Failed to remove rejected upload");
                }
                return Err(e);
            }
        };
        info!(
            asset_id = %origin.id,
            version_id = origin.version_id,
            platform = %origin.platform,
            "Artifact uploaded"
        );

        let nodes = match self.catalog.list_cache_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                error!(
                    asset_id = %origin.id,
                    error = %e,
                    "Could not list cache nodes, skipping replication"
                );
                return Ok(PublishReport {
                    origin,
                    replicas: Vec::new(),
                    replication_error: Some(format!("cache nodes unavailable: {e}")),
                });
            }
        };
        let local = self.store.path_of(&base.fd)?;
        let replicas = self.coordinator.replicate(&local, &base, &nodes).await;

        Ok(PublishReport {
            origin,
            replicas,
            replication_error: None,
        })
    }

    async fn record_origin(
        &self,
        upload: Upload,
    ) -> Result<(asset::Model, NewArtifact), PublishError> {
        let platform = platform::normalize_platform(&upload.platform)
            .ok_or_else(|| PublishError::InvalidPlatform(upload.platform.clone()))?;
        let version = self
            .ensure_version(&upload.version, upload.channel.as_deref())
            .await?;

        let filetype = filetype_of(&upload.filename);
        let wants_digest =
            !filetype.is_empty() && filetype.eq_ignore_ascii_case(self.digest_filetype);
        let digest = if wants_digest {
            let path = self.store.path_of(&upload.stored.fd)?;
            ContentDigest::compute_file(&path).await?.to_hex()
        } else {
            String::new()
        };

        let base = NewArtifact {
            name: upload.filename,
            digest,
            filetype,
            platform: platform.to_string(),
            fd: upload.stored.fd,
            size: upload.stored.size as i64,
            version_id: version.id,
        };
        let origin = self
            .catalog
            .create_artifact(base.clone(), self.coordinator.default_cache_id())
            .await?;
        self.events.notify_created(&origin);

        Ok((origin, base))
    }

    /// Existing version by name, or a new one in `channel`.
    pub async fn ensure_version(
        &self,
        name: &str,
        channel: Option<&str>,
    ) -> Result<version::Model, PublishError> {
        let name = name.trim();
        parse_version_name(name)
            .map_err(|_| PublishError::InvalidVersion(name.to_string()))?;

        if let Some(existing) = self.catalog.find_version_by_name(name).await? {
            return Ok(existing);
        }

        let channel = channel
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(version::DEFAULT_CHANNEL);
        let created = self
            .catalog
            .create_version(NewVersion {
                name: name.to_string(),
                channel: channel.to_string(),
            })
            .await;

        match created {
            Ok(model) => Ok(model),
            // Lost a race with a concurrent upload of the same version.
            Err(CatalogError::Conflict(_)) => self
                .catalog
                .find_version_by_name(name)
                .await?
                .ok_or_else(|| {
                    PublishError::Catalog(CatalogError::Query(format!(
                        "version '{name}' vanished after conflict"
                    )))
                }),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an artifact's file from its owning node, then delete the record
    /// and announce it. Returns `None` when no record had this id.
    ///
    /// The record survives a failed file removal so the deletion can be retried.
    pub async fn retract(&self, id: Uuid) -> Result<Option<asset::Model>, RemovalError> {
        let Some(artifact) = self.catalog.find_artifact(id).await? else {
            return Ok(None);
        };
        self.coordinator.remove(&artifact).await?;
        if !self.catalog.delete_artifact(id).await? {
            return Ok(None);
        }
        self.events.notify_destroyed(&artifact);
        info!(asset_id = %id, cache_id = artifact.cache_id, "Artifact deleted");

        Ok(Some(artifact))
    }
}
