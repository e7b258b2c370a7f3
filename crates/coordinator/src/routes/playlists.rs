//! Known playlists endpoint.

use axum::extract::State;
use axum::Json;
use database::resolve;

use crate::error::Result;
use crate::state::AppState;

/// Every playlist referenced by an intent or a group.
pub async fn available_playlists(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let playlists = resolve::list_known_playlists(state.db.pool()).await?;
    Ok(Json(playlists))
}
