//! Delayed publisher - wraps another publisher with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use mqtt_bridge::{BridgeError, Publisher};
use tokio::time::sleep;

/// A publisher that waits before handing off to the wrapped publisher.
///
/// Useful for simulating a slow transport.
#[derive(Debug, Clone)]
pub struct DelayedPublisher<P: Publisher> {
    inner: P,
    delay: Duration,
}

impl<P: Publisher> DelayedPublisher<P> {
    /// Create a new DelayedPublisher wrapping `inner` with the specified delay.
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a publisher with a delay in milliseconds.
    pub fn with_millis(inner: P, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get a reference to the wrapped publisher.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: Publisher> Publisher for DelayedPublisher<P> {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        sleep(self.delay).await;
        self.inner.publish(topic, payload).await
    }

    fn name(&self) -> &str {
        "DelayedPublisher"
    }
}
