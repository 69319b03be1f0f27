use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::Catalog;

/// Fire-and-forget download recorder.
///
/// Recording never blocks the caller; a background worker applies each
/// increment through the catalog and logs failures.
#[derive(Clone)]
pub struct DownloadCounter {
    tx: mpsc::UnboundedSender<Uuid>,
}

impl DownloadCounter {
    /// Start the worker. It exits once every counter handle is dropped.
    pub fn spawn(catalog: Arc<dyn Catalog>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Uuid>();

        let handle = tokio::spawn(async move {
            while let Some(asset_id) = rx.recv().await {
                match catalog.increment_download_count(asset_id).await {
                    Ok(()) => debug!(%asset_id, "Download recorded"),
                    Err(e) => warn!(%asset_id, error = %e, "Failed to record download"),
                }
            }
        });

        (Self { tx }, handle)
    }

    pub fn record(&self, asset_id: Uuid) {
        if self.tx.send(asset_id).is_err() {
            warn!(%asset_id, "Download counter worker has stopped");
        }
    }
}
