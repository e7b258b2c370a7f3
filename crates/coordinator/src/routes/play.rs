//! Synchronous play endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use dispatcher::DispatchOutcome;
use mqtt_bridge::PlayRequest;

use crate::error::Result;
use crate::state::AppState;

/// Dispatch a play request and report the outcome.
pub async fn play(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PlayRequest>, JsonRejection>,
) -> Result<Json<DispatchOutcome>> {
    let Json(request) = payload?;
    let dispatched = state.dispatcher.dispatch(&request).await?;
    Ok(Json(DispatchOutcome::ok(dispatched.summary())))
}
