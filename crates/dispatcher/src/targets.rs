//! Lookups the pipeline needs from the store.

use async_trait::async_trait;
use database::{resolve, Database, DatabaseError};

/// Resolves the two halves of a play request.
#[async_trait]
pub trait PlayTargets: Send + Sync {
    /// Pick one playlist for `intent`.
    async fn resolve_playlist(&self, intent: &str) -> Result<String, DatabaseError>;

    /// Find the speaker entity for `location`.
    async fn resolve_speaker(&self, location: &str) -> Result<String, DatabaseError>;
}

#[async_trait]
impl PlayTargets for Database {
    async fn resolve_playlist(&self, intent: &str) -> Result<String, DatabaseError> {
        resolve::resolve_playlist(self.pool(), intent).await
    }

    async fn resolve_speaker(&self, location: &str) -> Result<String, DatabaseError> {
        resolve::resolve_speaker(self.pool(), location).await
    }
}
