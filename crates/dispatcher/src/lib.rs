//! Play request dispatch for the music coordinator.
//!
//! This crate composes the store and the broker: a play request is
//! validated, its intent and location are resolved, and one playback
//! command is published. Two entry points share the pipeline:
//!
//! - [`Dispatcher::dispatch_outcome`] for synchronous callers (HTTP)
//! - [`PlayListener`] for requests arriving over MQTT
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use database::Database;
//! use dispatcher::{Dispatcher, PlayListener};
//! use mqtt_bridge::{BridgeConfig, MqttBridge, PLAY_TOPIC};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open("sqlite:music_coordinator.db?mode=rwc").await?;
//! let bridge = MqttBridge::connect(BridgeConfig::default()).await?;
//!
//! let dispatcher = Arc::new(Dispatcher::new(db, bridge.clone()));
//! let subscription = bridge.subscribe(PLAY_TOPIC).await?;
//!
//! PlayListener::new(subscription, dispatcher).run().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod listener;
pub mod pipeline;
pub mod targets;

pub use error::{store_kind, DispatchError, ErrorKind};
pub use listener::{ListenResult, ListenerStats, PlayListener};
pub use pipeline::{DispatchOutcome, Dispatched, Dispatcher};
pub use targets::PlayTargets;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
