//! SQLite persistence layer for the music coordinator.
//!
//! This crate stores intents, locations, and playlist groups using SQLx with
//! SQLite, and resolves them into a concrete playlist and speaker at
//! dispatch time.
//!
//! # Example
//!
//! ```no_run
//! use database::{intent, location, resolve, Database, PlaylistSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect, create the schema, and sweep orphaned rows
//!     let db = Database::open("sqlite:music_coordinator.db?mode=rwc").await?;
//!
//!     let source = PlaylistSource::direct(["Jingle Bells", "Carols"])?;
//!     intent::create_intent(db.pool(), "christmas", &source).await?;
//!     location::create_location(db.pool(), "garage", "media_player.garage").await?;
//!
//!     let playlist = resolve::resolve_playlist(db.pool(), "christmas").await?;
//!     let speaker = resolve::resolve_speaker(db.pool(), "garage").await?;
//!     println!("{} -> {}", playlist, speaker);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod intent;
pub mod location;
pub mod models;
pub mod playlist;
pub mod playlist_group;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{Intent, Location, PlaylistGroup, PlaylistSource};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 8;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases should use a pool size of 1 so every statement
    /// runs against the same database.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Connect and initialize in one step.
    pub async fn open(url: &str) -> Result<Self> {
        let db = Self::connect(url).await?;
        db.initialize().await?;
        Ok(db)
    }

    /// Create tables and indexes, apply column migrations, and sweep
    /// orphaned playlist group items.
    ///
    /// Safe to run on every startup. Returns the number of orphans removed.
    pub async fn initialize(&self) -> Result<u64> {
        tracing::info!("Initializing database schema...");
        let removed = schema::initialize(&self.pool).await?;
        tracing::info!("Schema ready");
        Ok(removed)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;

    /// A fresh, initialized in-memory database.
    pub async fn memory_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.initialize().await.unwrap();
        db
    }
}
