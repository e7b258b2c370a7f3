//! Location management routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::{location, Location};
use serde::Deserialize;

use crate::error::Result;
use crate::routes::{ack, Ack};
use crate::state::AppState;

/// Body accepted by create and update. `name` is ignored on update.
#[derive(Debug, Default, Deserialize)]
pub struct LocationBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub speaker_entity: String,
}

/// List all locations.
pub async fn list_locations(State(state): State<AppState>) -> Result<Json<Vec<Location>>> {
    Ok(Json(location::list_locations(state.db.pool()).await?))
}

/// Create a location.
pub async fn create_location(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LocationBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;
    location::create_location(state.db.pool(), &body.name, &body.speaker_entity).await?;
    Ok(ack(format!("Location '{}' created", body.name)))
}

/// Get one location.
pub async fn get_location(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Location>> {
    Ok(Json(location::get_location(state.db.pool(), &name).await?))
}

/// Point a location at a different speaker.
pub async fn update_location(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<LocationBody>, JsonRejection>,
) -> Result<Json<Ack>> {
    let Json(body) = payload?;
    location::update_location(state.db.pool(), &name, &body.speaker_entity).await?;
    Ok(ack(format!("Location '{}' updated", name)))
}

/// Delete a location.
pub async fn delete_location(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Ack>> {
    location::delete_location(state.db.pool(), &name).await?;
    Ok(ack(format!("Location '{}' deleted", name)))
}
