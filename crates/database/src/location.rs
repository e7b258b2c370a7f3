//! Location CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Location;
use crate::validation::require;

/// Create a new location.
pub async fn create_location(pool: &SqlitePool, name: &str, speaker_entity: &str) -> Result<()> {
    require("name", name)?;
    require("speaker_entity", speaker_entity)?;

    sqlx::query(
        r#"
        INSERT INTO location (name, speaker_entity)
        VALUES (?, ?)
        "#,
    )
    .bind(name)
    .bind(speaker_entity)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::on_conflict(e, "Location", name))?;

    Ok(())
}

/// Get a location by name.
pub async fn get_location(pool: &SqlitePool, name: &str) -> Result<Location> {
    sqlx::query_as::<_, Location>(
        r#"
        SELECT id, name, speaker_entity, created_at, updated_at
        FROM location
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Location",
        id: name.to_string(),
    })
}

/// List all locations, ordered by name.
pub async fn list_locations(pool: &SqlitePool) -> Result<Vec<Location>> {
    let locations = sqlx::query_as::<_, Location>(
        r#"
        SELECT id, name, speaker_entity, created_at, updated_at
        FROM location
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(locations)
}

/// Point an existing location at a different speaker.
pub async fn update_location(pool: &SqlitePool, name: &str, speaker_entity: &str) -> Result<()> {
    require("name", name)?;
    require("speaker_entity", speaker_entity)?;

    let result = sqlx::query(
        r#"
        UPDATE location
        SET speaker_entity = ?, updated_at = CURRENT_TIMESTAMP
        WHERE name = ?
        "#,
    )
    .bind(speaker_entity)
    .bind(name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Location",
            id: name.to_string(),
        });
    }

    Ok(())
}

/// Delete a location by name.
pub async fn delete_location(pool: &SqlitePool, name: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM location
        WHERE name = ?
        "#,
    )
    .bind(name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Location",
            id: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_db;

    #[tokio::test]
    async fn test_location_crud() {
        let db = memory_db().await;

        // Create
        create_location(db.pool(), "garage", "media_player.garage")
            .await
            .unwrap();

        // Read
        let location = get_location(db.pool(), "garage").await.unwrap();
        assert_eq!(location.speaker_entity, "media_player.garage");

        // Update
        update_location(db.pool(), "garage", "media_player.garage_sonos")
            .await
            .unwrap();
        let location = get_location(db.pool(), "garage").await.unwrap();
        assert_eq!(location.speaker_entity, "media_player.garage_sonos");

        // List
        assert_eq!(list_locations(db.pool()).await.unwrap().len(), 1);

        // Delete
        delete_location(db.pool(), "garage").await.unwrap();
        let result = get_location(db.pool(), "garage").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_location_requires_fields() {
        let db = memory_db().await;

        assert!(matches!(
            create_location(db.pool(), "", "media_player.x").await,
            Err(DatabaseError::Validation(_))
        ));
        assert!(matches!(
            create_location(db.pool(), "kitchen", "").await,
            Err(DatabaseError::Validation(_))
        ));
        assert!(list_locations(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_location_conflicts() {
        let db = memory_db().await;
        create_location(db.pool(), "office", "media_player.office")
            .await
            .unwrap();

        let result = create_location(db.pool(), "office", "media_player.other").await;
        assert!(matches!(
            result,
            Err(DatabaseError::AlreadyExists { entity: "Location", .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_location() {
        let db = memory_db().await;
        assert!(matches!(
            update_location(db.pool(), "attic", "media_player.attic").await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            delete_location(db.pool(), "attic").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
