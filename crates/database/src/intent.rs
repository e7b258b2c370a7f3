//! Intent CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Intent, IntentRow, PlaylistSource};
use crate::playlist::parse_playlists;
use crate::playlist_group::{group_exists, group_playlists};
use crate::validation::require;

/// Split a source into the two stored columns: (playlist, playlist_group).
fn stored_columns(source: &PlaylistSource) -> Result<(String, Option<&str>)> {
    match source {
        PlaylistSource::Direct(playlists) => Ok((serde_json::to_string(playlists)?, None)),
        PlaylistSource::Group(group) => Ok((String::new(), Some(group.as_str()))),
    }
}

/// Reject group references that point nowhere.
async fn ensure_group(pool: &SqlitePool, source: &PlaylistSource) -> Result<()> {
    if let PlaylistSource::Group(group) = source {
        if !group_exists(pool, group).await? {
            return Err(DatabaseError::NotFound {
                entity: "PlaylistGroup",
                id: group.clone(),
            });
        }
    }
    Ok(())
}

async fn into_intent(pool: &SqlitePool, row: IntentRow) -> Result<Intent> {
    let playlist_group = row.group().map(str::to_string);
    let playlists = match &playlist_group {
        Some(group) => group_playlists(pool, group).await?,
        None => parse_playlists(&row.playlist),
    };

    Ok(Intent {
        id: row.id,
        name: row.name,
        playlists,
        playlist_group,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Create a new intent.
pub async fn create_intent(pool: &SqlitePool, name: &str, source: &PlaylistSource) -> Result<()> {
    require("name", name)?;
    let source = source.validated()?;
    ensure_group(pool, &source).await?;
    let (playlist, playlist_group) = stored_columns(&source)?;

    sqlx::query(
        r#"
        INSERT INTO intent (name, playlist, playlist_group)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(playlist)
    .bind(playlist_group)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_conflict(e, "Intent", name))?;

    Ok(())
}

/// Get an intent by name.
pub async fn get_intent(pool: &SqlitePool, name: &str) -> Result<Intent> {
    let row = get_intent_row(pool, name).await?;
    into_intent(pool, row).await
}

pub(crate) async fn get_intent_row(pool: &SqlitePool, name: &str) -> Result<IntentRow> {
    sqlx::query_as::<_, IntentRow>(
        r#"
        SELECT id, name, playlist, playlist_group, created_at, updated_at
        FROM intent
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Intent",
        id: name.to_string(),
    })
}

/// List all intents, ordered by name.
pub async fn list_intents(pool: &SqlitePool) -> Result<Vec<Intent>> {
    let rows = sqlx::query_as::<_, IntentRow>(
        r#"
        SELECT id, name, playlist, playlist_group, created_at, updated_at
        FROM intent
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut intents = Vec::with_capacity(rows.len());
    for row in rows {
        intents.push(into_intent(pool, row).await?);
    }
    Ok(intents)
}

/// Replace an intent's playlist source.
///
/// Setting a group clears the direct list; setting a direct list clears the group.
pub async fn update_intent(pool: &SqlitePool, name: &str, source: &PlaylistSource) -> Result<()> {
    let source = source.validated()?;
    ensure_group(pool, &source).await?;
    let (playlist, playlist_group) = stored_columns(&source)?;

    let result = sqlx::query(
        r#"
        UPDATE intent
        SET playlist = ?, playlist_group = ?, updated_at = CURRENT_TIMESTAMP
        WHERE name = ?
        "#,
    )
    .bind(playlist)
    .bind(playlist_group)
    .bind(name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Intent",
            id: name.to_string(),
        });
    }

    Ok(())
}

/// Delete an intent by name.
pub async fn delete_intent(pool: &SqlitePool, name: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM intent
        WHERE name = ?
        "#,
    )
    .bind(name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Intent",
            id: name.to_string(),
        });
    }

    Ok(())
}
