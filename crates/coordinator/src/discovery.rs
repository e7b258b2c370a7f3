//! Media player discovery through the Home Assistant REST API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Entity id prefix of media players.
pub const MEDIA_PLAYER_PREFIX: &str = "media_player.";

/// Errors that can occur while talking to Home Assistant.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Request failed or the response was not JSON.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Home Assistant answered with a non-success status.
    #[error("Home Assistant returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// A media player entity known to Home Assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPlayer {
    pub entity_id: String,
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

impl MediaPlayer {
    /// The location name this player would get: its id without the prefix.
    pub fn location_name(&self) -> &str {
        self.entity_id
            .strip_prefix(MEDIA_PLAYER_PREFIX)
            .unwrap_or(&self.entity_id)
    }
}

/// Pick the media players out of a `/api/states` response.
///
/// Entries without a string `entity_id` are skipped.
pub fn media_players_from_states(states: &[Value]) -> Vec<MediaPlayer> {
    states
        .iter()
        .filter_map(|state| {
            let entity_id = state.get("entity_id")?.as_str()?;
            let short_name = entity_id.strip_prefix(MEDIA_PLAYER_PREFIX)?;

            let attributes = state.get("attributes");
            let attribute = |key: &str| {
                attributes
                    .and_then(|attrs| attrs.get(key))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            Some(MediaPlayer {
                entity_id: entity_id.to_string(),
                name: attribute("friendly_name").unwrap_or_else(|| short_name.to_string()),
                state: state
                    .get("state")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                device_name: attribute("device_name"),
            })
        })
        .collect()
}

/// Client for the Home Assistant REST API.
#[derive(Debug, Clone)]
pub struct HomeAssistantClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HomeAssistantClient {
    /// Create a client for `base_url` authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, DiscoveryError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Fetch every media player entity.
    pub async fn media_players(&self) -> Result<Vec<MediaPlayer>, DiscoveryError> {
        let url = format!("{}/api/states", self.base_url);
        debug!("Fetching entity states from {}", url);

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let states: Vec<Value> = response.json().await?;
        Ok(media_players_from_states(&states))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_players_from_states() {
        let states = vec![
            json!({
                "entity_id": "media_player.garage",
                "state": "idle",
                "attributes": {"friendly_name": "Garage Speaker", "device_name": "Sonos One"}
            }),
            json!({
                "entity_id": "media_player.kitchen",
                "state": "playing",
                "attributes": {}
            }),
            json!({"entity_id": "light.porch", "state": "on"}),
            json!({"state": "broken"}),
        ];

        let players = media_players_from_states(&states);
        assert_eq!(players.len(), 2);

        assert_eq!(players[0].name, "Garage Speaker");
        assert_eq!(players[0].device_name.as_deref(), Some("Sonos One"));
        assert_eq!(players[0].state, "idle");
        assert_eq!(players[0].location_name(), "garage");

        assert_eq!(players[1].name, "kitchen");
        assert!(players[1].device_name.is_none());
    }

    #[test]
    fn test_media_player_serialization() {
        let player = MediaPlayer {
            entity_id: "media_player.garage".to_string(),
            name: "Garage".to_string(),
            state: "off".to_string(),
            device_name: None,
        };
        let value = serde_json::to_value(&player).unwrap();
        assert!(value.get("device_name").is_none());
    }
}
