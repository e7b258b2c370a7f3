//! Message envelopes exchanged over the broker.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Topic carrying inbound play requests.
pub const PLAY_TOPIC: &str = "music-coordinator/play";

/// Topic the downstream automation system listens on for playback commands.
pub const COMMAND_TOPIC: &str = "homeassistant/service/mass/play_media";

/// Media type sent with every playback command.
pub const MEDIA_TYPE_PLAYLIST: &str = "playlist";

/// A request to play an intent at a location.
///
/// Missing fields decode as empty strings; emptiness is a validation
/// concern, not a decoding one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    /// Intent name (e.g., "christmas").
    #[serde(default)]
    pub intent: String,
    /// Location name (e.g., "garage").
    #[serde(default)]
    pub location: String,
}

impl PlayRequest {
    /// Create a new play request.
    pub fn new(intent: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            location: location.into(),
        }
    }
}

/// Playback command for the downstream actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCommand {
    /// Speaker entity (e.g., "media_player.garage").
    pub entity_id: String,
    /// Selected playlist.
    pub media_id: String,
    /// Always [`MEDIA_TYPE_PLAYLIST`].
    pub media_type: String,
}

impl PlayCommand {
    /// Command to play `playlist` on `speaker_entity`.
    pub fn playlist(speaker_entity: impl Into<String>, playlist: impl Into<String>) -> Self {
        Self {
            entity_id: speaker_entity.into(),
            media_id: playlist.into(),
            media_type: MEDIA_TYPE_PLAYLIST.to_string(),
        }
    }
}

/// A raw message delivered to a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// Decode the payload as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BridgeError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}
