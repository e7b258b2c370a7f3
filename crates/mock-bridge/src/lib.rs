//! Mock publishers for music coordinator dispatch.
//!
//! This crate provides mock implementations of the `Publisher` trait for testing:
//! - `RecordingPublisher` - Records every publish for later inspection
//! - `FailingPublisher` - Rejects every publish with a transport error
//! - `DelayedPublisher` - Wraps another publisher with artificial delay
//!
//! For a real broker connection, use `mqtt_bridge::MqttBridge` instead.
//!
//! # Example
//!
//! ```rust
//! use mock_bridge::{Publisher, RecordingPublisher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_bridge::BridgeError> {
//!     let publisher = RecordingPublisher::new();
//!
//!     publisher.publish("some/topic", b"hello".to_vec()).await?;
//!
//!     assert_eq!(publisher.count(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod recording;

// Re-export mqtt-bridge types for convenience
pub use mqtt_bridge::{BridgeError, Publisher};

pub use delayed::DelayedPublisher;
pub use failing::FailingPublisher;
pub use recording::{Published, RecordingPublisher};
