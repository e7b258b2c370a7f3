//! Error types for the dispatch pipeline.

use database::{DatabaseError, ValidationError};
use mqtt_bridge::BridgeError;
use thiserror::Error;

/// Errors that can end a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request was rejected before any lookup.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A store lookup failed.
    #[error(transparent)]
    Store(#[from] DatabaseError),

    /// The command could not be handed to the broker.
    #[error("publish failed: {0}")]
    Transport(#[from] BridgeError),

    /// The command could not be serialized.
    #[error("command encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Coarse error categories for callers that map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller can fix the request.
    Validation,
    /// A referenced intent, location, or playlist does not exist.
    NotFound,
    /// Storage, transport, or encoding failure.
    Internal,
}

impl DispatchError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Validation(_) => ErrorKind::Validation,
            DispatchError::Store(err) => store_kind(err),
            DispatchError::Transport(_) | DispatchError::Encode(_) => ErrorKind::Internal,
        }
    }
}

/// Classify a store error.
pub fn store_kind(err: &DatabaseError) -> ErrorKind {
    match err {
        DatabaseError::Validation(_) | DatabaseError::AlreadyExists { .. } => {
            ErrorKind::Validation
        }
        DatabaseError::NotFound { .. } | DatabaseError::NoPlaylistsAvailable { .. } => {
            ErrorKind::NotFound
        }
        DatabaseError::Sqlx(_) | DatabaseError::Json(_) => ErrorKind::Internal,
    }
}
