//! The outbound seam the dispatch pipeline depends on.

use async_trait::async_trait;

use crate::error::BridgeError;

/// Something that can hand a message to the broker.
///
/// Delivery is fire-and-forget: `Ok` means the message was handed off,
/// not that anyone received it. This trait is object-safe.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` on `topic`.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError>;

    /// Get a human-readable name for this publisher.
    fn name(&self) -> &str;
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for std::sync::Arc<P> {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        (**self).publish(topic, payload).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
