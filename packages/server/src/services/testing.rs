//! Scripted collaborators for service tests.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use common::transfer::{RemoteTransfer, TransferError, TransferTarget};

use super::events::ArtifactEvents;
use crate::entity::asset;

/// Records every call and fails for the listed hosts.
#[derive(Default)]
pub struct ScriptedTransfer {
    failing_hosts: Vec<String>,
    puts: Mutex<Vec<(String, String)>>,
    deletes: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransfer {
    pub fn failing_for(hosts: &[&str]) -> Self {
        Self {
            failing_hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    /// `(host, remote_path)` of every successful put.
    pub fn puts(&self) -> Vec<(String, String)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.deletes.lock().unwrap().clone()
    }

    fn check(&self, target: &TransferTarget) -> Result<(), TransferError> {
        if self.failing_hosts.contains(&target.host) {
            return Err(TransferError::new(target, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteTransfer for ScriptedTransfer {
    async fn put(
        &self,
        _local: &Path,
        remote_path: &str,
        target: &TransferTarget,
    ) -> Result<(), TransferError> {
        self.check(target)?;
        self.puts
            .lock()
            .unwrap()
            .push((target.host.clone(), remote_path.to_string()));
        Ok(())
    }

    async fn delete(
        &self,
        remote_path: &str,
        target: &TransferTarget,
    ) -> Result<(), TransferError> {
        self.check(target)?;
        self.deletes
            .lock()
            .unwrap()
            .push((target.host.clone(), remote_path.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    created: Mutex<Vec<asset::Model>>,
    destroyed: Mutex<Vec<asset::Model>>,
}

impl RecordingEvents {
    pub fn created(&self) -> Vec<asset::Model> {
        self.created.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<asset::Model> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl ArtifactEvents for RecordingEvents {
    fn notify_created(&self, artifact: &asset::Model) {
        self.created.lock().unwrap().push(artifact.clone());
    }

    fn notify_destroyed(&self, artifact: &asset::Model) {
        self.destroyed.lock().unwrap().push(artifact.clone());
    }
}
