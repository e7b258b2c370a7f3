//! Schema setup, forward-only migrations, and startup integrity sweeps.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::Result;

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS intent (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        playlist TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS location (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        speaker_entity TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playlist_group (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playlist_group_item (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_name TEXT NOT NULL,
        playlist TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (group_name) REFERENCES playlist_group(name) ON DELETE CASCADE,
        UNIQUE(group_name, playlist)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_intent_name ON intent(name)",
    "CREATE INDEX IF NOT EXISTS idx_location_name ON location(name)",
    "CREATE INDEX IF NOT EXISTS idx_playlist_group_name ON playlist_group(name)",
    "CREATE INDEX IF NOT EXISTS idx_playlist_group_item_group ON playlist_group_item(group_name)",
];

/// Columns added after the first release: (table, column, definition).
const ADDED_COLUMNS: &[(&str, &str, &str)] = &[("intent", "playlist_group", "TEXT")];

/// Create tables and indexes, then apply column migrations. Idempotent.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    for (table, column, definition) in ADDED_COLUMNS {
        add_column_if_missing(pool, table, column, definition).await?;
    }

    Ok(())
}

/// Whether `table` already has `column`.
pub async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?
        "#,
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Add a column unless it exists. A concurrent "duplicate column" is success.
async fn add_column_if_missing(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<()> {
    if has_column(pool, table, column).await? {
        return Ok(());
    }

    // SQLite has no ADD COLUMN IF NOT EXISTS.
    let statement = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition);
    match sqlx::query(&statement).execute(pool).await {
        Ok(_) => {
            info!(table, column, "Added column");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err))
            if db_err.message().contains("duplicate column")
                || db_err.message().contains("already exists") =>
        {
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete playlist group items whose group no longer exists.
///
/// Returns the number of rows removed.
pub async fn sweep_orphaned_items(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM playlist_group_item
        WHERE group_name NOT IN (SELECT name FROM playlist_group)
        "#,
    )
    .execute(pool)
    .await?;

    let removed = result.rows_affected();
    if removed > 0 {
        info!(removed, "Cleaned up orphaned playlist_group_item entries");
    }
    Ok(removed)
}

/// Full startup routine: schema, migrations, then a best-effort orphan sweep.
///
/// Returns the number of orphans removed; a failed sweep is logged and
/// counts as zero.
pub async fn initialize(pool: &SqlitePool) -> Result<u64> {
    create_schema(pool).await?;

    match sweep_orphaned_items(pool).await {
        Ok(removed) => Ok(removed),
        Err(e) => {
            warn!("Failed to cleanup orphaned playlist items: {}", e);
            Ok(0)
        }
    }
}
