//! Intent and location resolution used at dispatch time.

use std::collections::BTreeSet;

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::intent::get_intent_row;
use crate::playlist::{parse_playlists, select_random};
use crate::playlist_group::group_playlists;

/// Candidate playlists for an intent.
///
/// A non-empty group reference wins; the direct list is then ignored
/// whatever it contains.
pub async fn candidate_playlists(pool: &SqlitePool, intent_name: &str) -> Result<Vec<String>> {
    let row = get_intent_row(pool, intent_name).await?;
    match row.group() {
        Some(group) => group_playlists(pool, group).await,
        None => Ok(parse_playlists(&row.playlist)),
    }
}

/// Resolve an intent to one randomly selected playlist.
pub async fn resolve_playlist(pool: &SqlitePool, intent_name: &str) -> Result<String> {
    let candidates = candidate_playlists(pool, intent_name).await?;
    select_random(&candidates)
        .map(str::to_string)
        .ok_or_else(|| DatabaseError::NoPlaylistsAvailable {
            intent: intent_name.to_string(),
        })
}

/// Resolve a location to its speaker entity.
pub async fn resolve_speaker(pool: &SqlitePool, location_name: &str) -> Result<String> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT speaker_entity
        FROM location
        WHERE name = ?
        "#,
    )
    .bind(location_name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Location",
        id: location_name.to_string(),
    })
}

/// Every playlist reachable from a direct intent list or a group, sorted
/// and deduplicated.
pub async fn list_known_playlists(pool: &SqlitePool) -> Result<Vec<String>> {
    let mut known = BTreeSet::new();

    let direct = sqlx::query_scalar::<_, String>(
        r#"
        SELECT playlist
        FROM intent
        WHERE playlist != '' AND (playlist_group IS NULL OR playlist_group = '')
        "#,
    )
    .fetch_all(pool)
    .await?;

    for raw in direct {
        known.extend(parse_playlists(&raw));
    }

    let grouped = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT playlist
        FROM playlist_group_item
        WHERE playlist != ''
        "#,
    )
    .fetch_all(pool)
    .await?;

    known.extend(grouped);

    Ok(known.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::intent::create_intent;
    use crate::location::create_location;
    use crate::models::PlaylistSource;
    use crate::playlist_group::create_playlist_group;
    use crate::test_support::memory_db;

    #[tokio::test]
    async fn test_resolve_direct_playlists() {
        let db = memory_db().await;
        create_intent(db.pool(), "christmas", &PlaylistSource::direct(["X", "Y"]).unwrap())
            .await
            .unwrap();

        for _ in 0..20 {
            let picked = resolve_playlist(db.pool(), "christmas").await.unwrap();
            assert!(picked == "X" || picked == "Y");
        }
    }

    #[tokio::test]
    async fn test_every_playlist_reachable() {
        let db = memory_db().await;
        create_intent(
            db.pool(),
            "mix",
            &PlaylistSource::direct(["A", "B", "C"]).unwrap(),
        )
        .await
        .unwrap();

        let mut seen: HashMap<String, usize> = HashMap::new();
        for _ in 0..600 {
            let picked = resolve_playlist(db.pool(), "mix").await.unwrap();
            *seen.entry(picked).or_default() += 1;
        }

        assert_eq!(seen.len(), 3);
        for count in seen.values() {
            // Expected 200 each; a fair draw landing under 100 is vanishingly rare.
            assert!(*count > 100, "unexpectedly skewed: {:?}", seen);
        }
    }

    #[tokio::test]
    async fn test_group_takes_precedence_over_direct_list() {
        let db = memory_db().await;
        create_playlist_group(db.pool(), "holidays", &["G1"]).await.unwrap();
        create_intent(db.pool(), "both", &PlaylistSource::direct(["D1", "D2"]).unwrap())
            .await
            .unwrap();

        // Write both columns behind the store's back.
        sqlx::query("UPDATE intent SET playlist_group = 'holidays' WHERE name = 'both'")
            .execute(db.pool())
            .await
            .unwrap();

        for _ in 0..20 {
            assert_eq!(resolve_playlist(db.pool(), "both").await.unwrap(), "G1");
        }
        assert_eq!(candidate_playlists(db.pool(), "both").await.unwrap(), vec!["G1"]);
    }

    #[tokio::test]
    async fn test_legacy_text_formats() {
        let db = memory_db().await;
        sqlx::query("INSERT INTO intent (name, playlist) VALUES ('csv', 'p1, p2, p3'), ('one', 'p1')")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(
            candidate_playlists(db.pool(), "csv").await.unwrap(),
            vec!["p1", "p2", "p3"]
        );
        assert_eq!(candidate_playlists(db.pool(), "one").await.unwrap(), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_unknown_intent() {
        let db = memory_db().await;
        let result = resolve_playlist(db.pool(), "nope").await;
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { entity: "Intent", ref id }) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn test_empty_group_has_no_playlists() {
        let db = memory_db().await;
        create_playlist_group(db.pool(), "empty", &[""]).await.unwrap();
        create_intent(db.pool(), "silence", &PlaylistSource::group("empty").unwrap())
            .await
            .unwrap();

        let result = resolve_playlist(db.pool(), "silence").await;
        assert!(matches!(result, Err(DatabaseError::NoPlaylistsAvailable { .. })));
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_resolve_speaker() {
        let db = memory_db().await;
        create_location(db.pool(), "garage", "media_player.garage")
            .await
            .unwrap();

        assert_eq!(
            resolve_speaker(db.pool(), "garage").await.unwrap(),
            "media_player.garage"
        );
        assert!(matches!(
            resolve_speaker(db.pool(), "attic").await,
            Err(DatabaseError::NotFound { entity: "Location", .. })
        ));
    }

    #[tokio::test]
    async fn test_list_known_playlists() {
        let db = memory_db().await;
        create_playlist_group(db.pool(), "holidays", &["Carols", "Beta"])
            .await
            .unwrap();
        create_intent(db.pool(), "a", &PlaylistSource::direct(["Zulu", "Beta"]).unwrap())
            .await
            .unwrap();
        create_intent(db.pool(), "b", &PlaylistSource::group("holidays").unwrap())
            .await
            .unwrap();

        assert_eq!(
            list_known_playlists(db.pool()).await.unwrap(),
            vec!["Beta", "Carols", "Zulu"]
        );
    }
}
