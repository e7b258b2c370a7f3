//! MQTT bridge for the music coordinator.
//!
//! This crate keeps one long-lived connection to an MQTT broker. It supports:
//!
//! - Subscribing to topic filters, with inbound messages delivered as a stream
//! - Fire-and-forget publishing at QoS 0
//! - Automatic reconnection with a fixed retry interval
//!
//! # Example
//!
//! ```no_run
//! use mqtt_bridge::{BridgeConfig, MqttBridge, PlayCommand, PlayRequest, COMMAND_TOPIC, PLAY_TOPIC};
//!
//! # async fn example() -> Result<(), mqtt_bridge::BridgeError> {
//! let config = BridgeConfig::from_address("localhost:1883", "music-coordinator")?;
//! let bridge = MqttBridge::connect(config).await?;
//!
//! // Publish a playback command
//! bridge.publish_json(COMMAND_TOPIC, &PlayCommand::playlist("media_player.garage", "Carols"))?;
//!
//! // Receive play requests
//! let mut requests = bridge.subscribe(PLAY_TOPIC).await?;
//! while let Some(message) = requests.recv().await {
//!     let request: PlayRequest = message.decode()?;
//!     println!("play {} in {}", request.intent, request.location);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod publisher;
pub mod subscription;
pub mod types;

pub use client::MqttBridge;
pub use config::{BridgeConfig, DEFAULT_PORT};
pub use error::BridgeError;
pub use publisher::Publisher;
pub use subscription::Subscription;
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
