//! Media player discovery and location sync routes.

use std::collections::HashSet;

use axum::extract::State;
use axum::Json;
use database::{location, Database, Result as DbResult};
use serde::Serialize;
use tracing::{info, warn};

use crate::discovery::MediaPlayer;
use crate::error::Result;
use crate::routes::{ack, Ack};
use crate::state::AppState;

/// Counts from one location sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub skipped: usize,
}

/// List the media players Home Assistant knows about.
pub async fn list_media_players(State(state): State<AppState>) -> Result<Json<Vec<MediaPlayer>>> {
    Ok(Json(state.home_assistant.media_players().await?))
}

/// Create a location for every discovered media player that lacks one.
pub async fn sync_locations(State(state): State<AppState>) -> Result<Json<Ack>> {
    let players = state.home_assistant.media_players().await?;
    if players.is_empty() {
        return Ok(ack("No media players found in Home Assistant"));
    }

    let report = sync_players(&state.db, &players).await?;
    info!(
        created = report.created,
        skipped = report.skipped,
        "Synced locations from Home Assistant"
    );
    Ok(ack(format!(
        "Synced locations: {} created, {} skipped",
        report.created, report.skipped
    )))
}

/// Create locations named after each player's id without the prefix.
///
/// Names that already exist are skipped. A player whose location cannot be
/// created is left out of both counts.
pub async fn sync_players(db: &Database, players: &[MediaPlayer]) -> DbResult<SyncReport> {
    let pool = db.pool();
    let mut existing: HashSet<String> = location::list_locations(pool)
        .await?
        .into_iter()
        .map(|location| location.name)
        .collect();

    let mut report = SyncReport::default();
    for player in players {
        let name = player.location_name();
        if existing.contains(name) {
            report.skipped += 1;
            continue;
        }

        match location::create_location(pool, name, &player.entity_id).await {
            Ok(()) => {
                existing.insert(name.to_string());
                report.created += 1;
            }
            Err(e) => warn!("Could not create location for {}: {}", player.entity_id, e),
        }
    }
    Ok(report)
}
