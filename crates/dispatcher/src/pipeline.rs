//! The dispatch pipeline: validate, resolve, publish.

use database::validation::require_present;
use mqtt_bridge::{PlayCommand, PlayRequest, Publisher, COMMAND_TOPIC};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::targets::PlayTargets;

/// A play request that reached the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// Intent name from the request.
    pub intent: String,
    /// Location name from the request.
    pub location: String,
    /// The command that was published.
    pub command: PlayCommand,
}

impl Dispatched {
    /// Human-readable confirmation.
    pub fn summary(&self) -> String {
        format!("Playing intent '{}' on '{}'", self.intent, self.location)
    }
}

/// Result of a synchronous dispatch, shaped for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    /// A successful outcome with `message`.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// A failed outcome describing `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Turns play requests into published playback commands.
///
/// Both collaborators are injected, so tests can pair a real store with a
/// recording publisher.
#[derive(Debug, Clone)]
pub struct Dispatcher<T: PlayTargets, P: Publisher> {
    targets: T,
    publisher: P,
    command_topic: String,
}

impl<T: PlayTargets, P: Publisher> Dispatcher<T, P> {
    /// Create a dispatcher publishing on the standard command topic.
    pub fn new(targets: T, publisher: P) -> Self {
        Self::with_command_topic(targets, publisher, COMMAND_TOPIC)
    }

    /// Create a dispatcher publishing on `command_topic`.
    pub fn with_command_topic(targets: T, publisher: P, command_topic: impl Into<String>) -> Self {
        Self {
            targets,
            publisher,
            command_topic: command_topic.into(),
        }
    }

    /// Get a reference to the lookup collaborator.
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Get a reference to the publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Dispatch one play request.
    ///
    /// The playlist and speaker lookups run concurrently. When both fail,
    /// the intent error is returned and the location error is logged.
    /// Nothing is published unless both succeed.
    pub async fn dispatch(&self, request: &PlayRequest) -> Result<Dispatched, DispatchError> {
        require_present("intent", &request.intent)?;
        require_present("location", &request.location)?;

        debug!(intent = %request.intent, location = %request.location, "Resolving play request");

        let (playlist, speaker) = tokio::join!(
            self.targets.resolve_playlist(&request.intent),
            self.targets.resolve_speaker(&request.location),
        );

        let (playlist, speaker) = match (playlist, speaker) {
            (Ok(playlist), Ok(speaker)) => (playlist, speaker),
            (Err(intent_err), Ok(_)) => return Err(intent_err.into()),
            (Ok(_), Err(location_err)) => return Err(location_err.into()),
            (Err(intent_err), Err(location_err)) => {
                warn!(location = %request.location, "Location lookup also failed: {}", location_err);
                return Err(intent_err.into());
            }
        };

        debug!(
            intent = %request.intent,
            playlist = %playlist,
            speaker = %speaker,
            "Resolved play request"
        );

        let command = PlayCommand::playlist(speaker, playlist);
        let payload = serde_json::to_vec(&command).map_err(DispatchError::Encode)?;
        self.publisher.publish(&self.command_topic, payload).await?;

        info!(
            intent = %request.intent,
            location = %request.location,
            playlist = %command.media_id,
            speaker = %command.entity_id,
            "Dispatched play command via {}",
            self.publisher.name()
        );

        Ok(Dispatched {
            intent: request.intent.clone(),
            location: request.location.clone(),
            command,
        })
    }

    /// Dispatch and fold the result into a [`DispatchOutcome`].
    pub async fn dispatch_outcome(&self, request: &PlayRequest) -> DispatchOutcome {
        match self.dispatch(request).await {
            Ok(dispatched) => DispatchOutcome::ok(dispatched.summary()),
            Err(e) => DispatchOutcome::failed(e.to_string()),
        }
    }
}
