use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A typed notification that can be published to subscribers.
pub trait Event: Send + Sync + Sized + Serialize + DeserializeOwned {
    /// Topic subscribers filter on (e.g. "artifact_created").
    fn topic(&self) -> &str;

    /// Wrap the event in an untyped envelope stamped with the current time.
    fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        Ok(EventEnvelope {
            topic: self.topic().to_string(),
            payload: serde_json::to_value(self)?,
            emitted_at: Utc::now(),
        })
    }

    /// Recover the typed event from an envelope.
    fn from_envelope(envelope: &EventEnvelope) -> Result<Self, serde_json::Error> {
        serde_json::from_value(envelope.payload.clone())
    }
}

/// Untyped event as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub topic: String,
    pub payload: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}
