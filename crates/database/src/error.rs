//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, constraint, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Playlist list could not be serialized for storage.
    #[error("playlist encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Input rejected before anything was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The intent resolved to an empty candidate set.
    #[error("no playlists available for intent: {intent}")]
    NoPlaylistsAvailable { intent: String },
}

impl DatabaseError {
    /// Whether the error means a referenced record (or any playlist) is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DatabaseError::NotFound { .. } | DatabaseError::NoPlaylistsAvailable { .. }
        )
    }

    /// Map a unique-constraint violation to [`DatabaseError::AlreadyExists`].
    pub(crate) fn on_conflict(err: sqlx::Error, entity: &'static str, id: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
