//! Failing publisher - rejects every publish.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mqtt_bridge::{BridgeError, Publisher};

/// A publisher whose hand-off always fails.
///
/// Useful for testing how dispatch reports transport errors.
#[derive(Debug, Clone, Default)]
pub struct FailingPublisher {
    reason: Option<String>,
    attempts: Arc<AtomicUsize>,
}

impl FailingPublisher {
    /// Create a new FailingPublisher with a generic reason.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FailingPublisher that reports `reason`.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Number of publishes attempted so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), BridgeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let reason = self
            .reason
            .clone()
            .unwrap_or_else(|| "broker unavailable".to_string());
        Err(BridgeError::Connection(reason))
    }

    fn name(&self) -> &str {
        "FailingPublisher"
    }
}
