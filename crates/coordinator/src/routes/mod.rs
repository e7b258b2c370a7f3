//! Route handlers for the coordinator HTTP API.

pub mod health;
pub mod intents;
pub mod locations;
pub mod media_players;
pub mod play;
pub mod playlist_groups;
pub mod playlists;

use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Success body for write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

/// Wrap `message` in a success body.
pub fn ack(message: impl Into<String>) -> Json<Ack> {
    Json(Ack {
        success: true,
        message: message.into(),
    })
}

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Play requests
        .route("/api/play", post(play::play))
        .route("/play", post(play::play))
        // Intents
        .route(
            "/api/intents",
            get(intents::list_intents).post(intents::create_intent),
        )
        .route(
            "/api/intents/:name",
            get(intents::get_intent)
                .put(intents::update_intent)
                .delete(intents::delete_intent),
        )
        // Locations
        .route(
            "/api/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/api/locations/:name",
            get(locations::get_location)
                .put(locations::update_location)
                .delete(locations::delete_location),
        )
        // Playlist groups
        .route(
            "/api/playlist-groups",
            get(playlist_groups::list_groups).post(playlist_groups::create_group),
        )
        .route(
            "/api/playlist-groups/:name",
            get(playlist_groups::get_group)
                .put(playlist_groups::update_group)
                .delete(playlist_groups::delete_group),
        )
        .route(
            "/api/available-playlists",
            get(playlists::available_playlists),
        )
        // Discovery
        .route("/api/media-players", get(media_players::list_media_players))
        .route("/api/sync-locations", post(media_players::sync_locations))
        // Health check
        .route("/health", get(health::health))
}

/// CORS policy: any origin, the methods the API uses.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
