//! Playlist group CRUD operations.
//!
//! Member rows are always written as a batch inside one transaction, so a
//! reader never sees a half-replaced member set.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{PlaylistGroup, PlaylistGroupRow};
use crate::validation::require;

/// Whether a group with this name exists.
pub async fn group_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM playlist_group WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Member playlists of a group, ordered by playlist. Empty for unknown groups.
pub async fn group_playlists(pool: &SqlitePool, name: &str) -> Result<Vec<String>> {
    let playlists = sqlx::query_scalar::<_, String>(
        r#"
        SELECT playlist
        FROM playlist_group_item
        WHERE group_name = ?
        ORDER BY playlist
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await?;

    Ok(playlists)
}

async fn insert_members<S: AsRef<str>>(
    conn: &mut SqliteConnection,
    name: &str,
    playlists: &[S],
) -> Result<()> {
    for playlist in playlists {
        let playlist = playlist.as_ref();
        if playlist.is_empty() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO playlist_group_item (group_name, playlist)
            VALUES (?, ?)
            "#,
        )
        .bind(name)
        .bind(playlist)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            DatabaseError::on_conflict(e, "PlaylistGroupItem", &format!("{}/{}", name, playlist))
        })?;
    }
    Ok(())
}

/// Create a group and its members atomically.
pub async fn create_playlist_group<S: AsRef<str>>(
    pool: &SqlitePool,
    name: &str,
    playlists: &[S],
) -> Result<()> {
    require("name", name)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO playlist_group (name)
        VALUES (?)
        "#,
    )
    .bind(name)
    .execute(&mut *tx)
    .await
    .map_err(|e| DatabaseError::on_conflict(e, "PlaylistGroup", name))?;

    insert_members(&mut *tx, name, playlists).await?;

    tx.commit().await?;
    Ok(())
}

/// Get a group with its members.
pub async fn get_playlist_group(pool: &SqlitePool, name: &str) -> Result<PlaylistGroup> {
    let row = sqlx::query_as::<_, PlaylistGroupRow>(
        r#"
        SELECT id, name, created_at, updated_at
        FROM playlist_group
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "PlaylistGroup",
        id: name.to_string(),
    })?;

    let playlists = group_playlists(pool, &row.name).await?;
    Ok(row.with_playlists(playlists))
}

/// List all groups with their members, ordered by name.
pub async fn list_playlist_groups(pool: &SqlitePool) -> Result<Vec<PlaylistGroup>> {
    let rows = sqlx::query_as::<_, PlaylistGroupRow>(
        r#"
        SELECT id, name, created_at, updated_at
        FROM playlist_group
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut groups = Vec::with_capacity(rows.len());
    for row in rows {
        let playlists = group_playlists(pool, &row.name).await?;
        groups.push(row.with_playlists(playlists));
    }
    Ok(groups)
}

/// Replace a group's full member set atomically.
///
/// On any failure the transaction rolls back and the old members stay.
pub async fn update_playlist_group<S: AsRef<str>>(
    pool: &SqlitePool,
    name: &str,
    playlists: &[S],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    // Writing first takes the write lock, so concurrent replacements of the
    // same group queue up instead of interleaving.
    let result = sqlx::query(
        r#"
        UPDATE playlist_group
        SET updated_at = CURRENT_TIMESTAMP
        WHERE name = ?
        "#,
    )
    .bind(name)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "PlaylistGroup",
            id: name.to_string(),
        });
    }

    sqlx::query(
        r#"
        DELETE FROM playlist_group_item
        WHERE group_name = ?
        "#,
    )
    .bind(name)
    .execute(&mut *tx)
    .await?;

    insert_members(&mut *tx, name, playlists).await?;

    tx.commit().await?;
    Ok(())
}

/// Delete a group and all of its members.
pub async fn delete_playlist_group(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    // The foreign key cascades too; this keeps the delete correct on
    // connections that run without foreign key enforcement.
    sqlx::query(
        r#"
        DELETE FROM playlist_group_item
        WHERE group_name = ?
        "#,
    )
    .bind(name)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query(
        r#"
        DELETE FROM playlist_group
        WHERE name = ?
        "#,
    )
    .bind(name)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "PlaylistGroup",
            id: name.to_string(),
        });
    }

    tx.commit().await?;
    Ok(())
}
