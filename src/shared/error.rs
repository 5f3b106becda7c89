//! Application Error Types
//!
//! Centralized error handling with Axum integration, plus the
//! real-time error taxonomy used by the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type (HTTP surface)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10005, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 10007, msg.clone()),
            AppError::Unavailable(msg) => {
                tracing::warn!("Dependency unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, 10008, "Service unavailable".into())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        (status, Json(ErrorResponse { code, message })).into_response()
    }
}

/// Errors raised while handling real-time traffic.
///
/// `Auth` and `RoomNotFound` are surfaced to the client as an explicit
/// error frame; everything else is logged and absorbed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("room registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl SyncError {
    /// Stable code used in `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Auth(_) => "unauthorized",
            SyncError::RoomNotFound(_) => "room-not-found",
            SyncError::RegistryUnavailable(_) => "registry-unavailable",
            SyncError::ProtocolViolation(_) => "protocol-violation",
            SyncError::PeerUnreachable(_) => "peer-unreachable",
            SyncError::TransportFailure(_) => "transport-failure",
        }
    }

    /// Whether the client is told about this error with an `error` frame.
    pub fn is_client_visible(&self) -> bool {
        !matches!(
            self,
            SyncError::PeerUnreachable(_) | SyncError::TransportFailure(_)
        )
    }
}
