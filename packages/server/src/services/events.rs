use common::event::{Event, EventEnvelope};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::entity::asset;

pub const TOPIC_ARTIFACT_CREATED: &str = "artifact_created";
pub const TOPIC_ARTIFACT_DESTROYED: &str = "artifact_destroyed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "artifact", rename_all = "snake_case")]
pub enum ArtifactEvent {
    Created(asset::Model),
    Destroyed(asset::Model),
}

impl Event for ArtifactEvent {
    fn topic(&self) -> &str {
        match self {
            ArtifactEvent::Created(_) => TOPIC_ARTIFACT_CREATED,
            ArtifactEvent::Destroyed(_) => TOPIC_ARTIFACT_DESTROYED,
        }
    }
}

/// Receives artifact lifecycle notifications. Implementations must not block.
pub trait ArtifactEvents: Send + Sync {
    fn notify_created(&self, artifact: &asset::Model);
    fn notify_destroyed(&self, artifact: &asset::Model);
}

pub struct NoopEvents;

impl ArtifactEvents for NoopEvents {
    fn notify_created(&self, _artifact: &asset::Model) {}
    fn notify_destroyed(&self, _artifact: &asset::Model) {}
}

/// Publishes events to every current subscriber of a broadcast channel.
pub struct BroadcastEvents {
    tx: broadcast::Sender<EventEnvelope>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    fn publish(&self, event: ArtifactEvent) {
        let envelope = match event.to_envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(topic = event.topic(), error = %e, "Failed to encode event");
                return;
            }
        };
        // No receivers is not an error.
        if let Ok(receivers) = self.tx.send(envelope) {
            debug!(topic = event.topic(), receivers, "Event published");
        }
    }
}

impl ArtifactEvents for BroadcastEvents {
    fn notify_created(&self, artifact: &asset::Model) {
        self.publish(ArtifactEvent::Created(artifact.clone()));
    }

    fn notify_destroyed(&self, artifact: &asset::Model) {
        self.publish(ArtifactEvent::Destroyed(artifact.clone()));
    }
}
