//! Playlist group management routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::{playlist_group, PlaylistGroup};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::routes::{ack, Ack};
use crate::state::AppState;

/// Body accepted by create and update. `name` is ignored on update.
#[derive(Debug, Default, Deserialize)]
pub struct GroupBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playlists: Vec<String>,
}

impl GroupBody {
    /// Non-blank members; at least one is required.
    fn members(&self) -> Result<Vec<&str>> {
        let members: Vec<&str> = self
            .playlists
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if members.is_empty() {
            return Err(ApiError::BadRequest(
                "at least one playlist is required".to_string(),
            ));
        }
        Ok(members)
    }
}

/// List all groups with their members.
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<PlaylistGroup>>> {
    Ok(Json(
        playlist_group::list_playlist_groups(state.db.pool()).await?,
    ))
}

/// Create a group.
pub async fn create_group(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GroupBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;
    let members = body.members()?;
    playlist_group::create_playlist_group(state.db.pool(), &body.name, &members).await?;
    Ok(ack(format!(
        "Playlist group '{}' created with {} playlist(s)",
        body.name,
        members.len()
    )))
}

/// Get one group.
pub async fn get_group(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlaylistGroup>> {
    Ok(Json(
        playlist_group::get_playlist_group(state.db.pool(), &name).await?,
    ))
}

/// Replace a group's members.
pub async fn update_group(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<GroupBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;
    let members = body.members()?;
    playlist_group::update_playlist_group(state.db.pool(), &name, &members).await?;
    Ok(ack(format!(
        "Playlist group '{}' updated with {} playlist(s)",
        name,
        members.len()
    )))
}

/// Delete a group.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Ack>> {
    playlist_group::delete_playlist_group(state.db.pool(), &name).await?;
    Ok(ack(format!("Playlist group '{}' deleted", name)))
}
