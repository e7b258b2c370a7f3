//! Error types for mqtt-bridge.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the broker.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The request could not be handed off to the MQTT event loop.
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The broker refused a subscription.
    #[error("Subscription to {0} rejected by broker")]
    SubscribeRejected(String),

    /// The broker never acknowledged a subscription.
    #[error("Subscription to {filter} not acknowledged within {timeout:?}")]
    SubscribeTimeout { filter: String, timeout: Duration },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
