use std::sync::Arc;

use common::storage::FileStore;
use common::transfer::RemoteTransfer;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::services::counter::DownloadCounter;
use crate::services::dispatcher::DownloadDispatcher;
use crate::services::events::ArtifactEvents;
use crate::services::publish::Publisher;
use crate::services::replication::ReplicationCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn Catalog>,
    pub store: Arc<dyn FileStore>,
    pub transfer: Arc<dyn RemoteTransfer>,
    pub events: Arc<dyn ArtifactEvents>,
    pub counter: DownloadCounter,
}

impl AppState {
    pub fn default_cache_id(&self) -> i32 {
        self.config.cache.default_cache_id
    }

    pub fn dispatcher(&self) -> DownloadDispatcher<'_> {
        DownloadDispatcher::new(
            &*self.catalog,
            &*self.store,
            &self.counter,
            self.default_cache_id(),
        )
    }

    pub fn coordinator(&self) -> ReplicationCoordinator<'_> {
        ReplicationCoordinator::new(
            &*self.catalog,
            &*self.store,
            &*self.transfer,
            &*self.events,
            self.default_cache_id(),
        )
    }

    pub fn publisher(&self) -> Publisher<'_> {
        Publisher::new(
            &*self.catalog,
            &*self.store,
            &*self.events,
            self.coordinator(),
            &self.config.download.digest_filetype,
        )
    }
}
