//! Error types for the HTTP API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use dispatcher::{store_kind, DispatchError, ErrorKind};
use thiserror::Error;

use crate::discovery::DiscoveryError;

/// Errors that can occur while handling an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Store operation failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Play request failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Home Assistant could not be queried.
    #[error("Failed to fetch media players: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(err) => store_status(err),
            ApiError::Dispatch(DispatchError::Store(err)) => store_status(err),
            ApiError::Dispatch(err) => kind_status(err.kind()),
            ApiError::Discovery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn store_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::AlreadyExists { .. } => StatusCode::CONFLICT,
        other => kind_status(store_kind(other)),
    }
}

fn kind_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, message);
        }

        let body = serde_json::json!({
            "success": false,
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
