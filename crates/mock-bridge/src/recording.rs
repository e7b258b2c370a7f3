//! Recording publisher - keeps every publish for inspection.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use mqtt_bridge::{BridgeError, Publisher};
use serde::de::DeserializeOwned;

/// A single recorded publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw payload.
    pub payload: Vec<u8>,
}

impl Published {
    /// Decode the payload as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// A publisher that records messages instead of sending them.
///
/// Clones share the same record, so a test can keep one handle and give
/// the other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<Published>>>,
}

impl RecordingPublisher {
    /// Create a new, empty RecordingPublisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far, oldest first.
    pub fn published(&self) -> Vec<Published> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages published on `topic`.
    pub fn published_on(&self, topic: &str) -> Vec<Published> {
        self.published()
            .into_iter()
            .filter(|message| message.topic == topic)
            .collect()
    }

    /// Number of messages published so far.
    pub fn count(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Published {
                topic: topic.to_string(),
                payload,
            });
        Ok(())
    }

    fn name(&self) -> &str {
        "RecordingPublisher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqtt_bridge::{PlayCommand, COMMAND_TOPIC};

    #[tokio::test]
    async fn test_records_in_order() {
        let publisher = RecordingPublisher::new();
        publisher.publish("a", b"1".to_vec()).await.unwrap();
        publisher.publish("b", b"2".to_vec()).await.unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].topic, "a");
        assert_eq!(published[1].payload, b"2".to_vec());
        assert_eq!(publisher.published_on("b").len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_record() {
        let publisher = RecordingPublisher::new();
        let handle = publisher.clone();

        let command = PlayCommand::playlist("media_player.garage", "X");
        publisher
            .publish(COMMAND_TOPIC, serde_json::to_vec(&command).unwrap())
            .await
            .unwrap();

        assert_eq!(handle.count(), 1);
        let decoded: PlayCommand = handle.published()[0].decode().unwrap();
        assert_eq!(decoded, command);

        handle.clear();
        assert_eq!(publisher.count(), 0);
    }

    #[test]
    fn test_publisher_name() {
        assert_eq!(RecordingPublisher::new().name(), "RecordingPublisher");
    }
}
