//! Intent management routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::{intent, Intent, PlaylistSource, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::routes::{ack, Ack};
use crate::state::AppState;

/// Body accepted by create and update.
///
/// `playlist` is the single-playlist form older clients send; it is used
/// only when `playlists` has no entries.
#[derive(Debug, Default, Deserialize)]
pub struct IntentBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playlists: Vec<String>,
    #[serde(default)]
    pub playlist: String,
    #[serde(default)]
    pub playlist_group: Option<String>,
}

impl IntentBody {
    fn source(&self) -> std::result::Result<PlaylistSource, ValidationError> {
        let has_list = self.playlists.iter().any(|p| !p.trim().is_empty());
        let playlists = if has_list {
            self.playlists.clone()
        } else {
            vec![self.playlist.clone()]
        };
        PlaylistSource::from_parts(playlists, self.playlist_group.as_deref())
    }
}

/// An intent as returned by the API, with the legacy single `playlist` field.
#[derive(Debug, Serialize)]
pub struct IntentView {
    #[serde(flatten)]
    pub intent: Intent,
    pub playlist: String,
}

impl From<Intent> for IntentView {
    fn from(intent: Intent) -> Self {
        let playlist = intent.primary_playlist().unwrap_or_default().to_string();
        Self { intent, playlist }
    }
}

fn describe(source: &PlaylistSource) -> String {
    match source {
        PlaylistSource::Direct(playlists) => format!("{} playlist(s)", playlists.len()),
        PlaylistSource::Group(group) => format!("playlist group '{}'", group),
    }
}

/// List all intents.
pub async fn list_intents(State(state): State<AppState>) -> Result<Json<Vec<IntentView>>> {
    let intents = intent::list_intents(state.db.pool()).await?;
    Ok(Json(intents.into_iter().map(IntentView::from).collect()))
}

/// Create an intent.
pub async fn create_intent(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IntentBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;
    let source = body.source()?;
    intent::create_intent(state.db.pool(), &body.name, &source).await?;
    Ok(ack(format!(
        "Intent '{}' created with {}",
        body.name,
        describe(&source)
    )))
}

/// Get one intent.
pub async fn get_intent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<IntentView>> {
    let intent = intent::get_intent(state.db.pool(), &name).await?;
    Ok(Json(intent.into()))
}

/// Replace an intent's playlist source.
pub async fn update_intent(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<IntentBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;
    let source = body.source()?;
    intent::update_intent(state.db.pool(), &name, &source).await?;
    Ok(ack(format!("Intent '{}' updated with {}", name, describe(&source))))
}

/// Delete an intent.
pub async fn delete_intent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Ack>> {
    intent::delete_intent(state.db.pool(), &name).await?;
    Ok(ack(format!("Intent '{}' deleted", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_single_playlist() {
        let body: IntentBody =
            serde_json::from_str(r#"{"name": "x", "playlist": "Carols"}"#).unwrap();
        assert_eq!(
            body.source().unwrap(),
            PlaylistSource::Direct(vec!["Carols".to_string()])
        );
    }

    #[test]
    fn test_list_beats_legacy_field() {
        let body: IntentBody =
            serde_json::from_str(r#"{"playlists": ["A", "B"], "playlist": "C"}"#).unwrap();
        assert_eq!(
            body.source().unwrap(),
            PlaylistSource::Direct(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_group_body() {
        let body: IntentBody =
            serde_json::from_str(r#"{"playlists": ["A"], "playlist_group": "winter"}"#).unwrap();
        assert_eq!(
            body.source().unwrap(),
            PlaylistSource::Group("winter".to_string())
        );
    }

    #[test]
    fn test_no_source() {
        let body: IntentBody = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(body.source(), Err(ValidationError::MissingPlaylistSource));
    }
}
