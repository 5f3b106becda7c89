//! Authentication Middleware
//!
//! Bearer token validation for protected routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::application::services::{verify_within, AuthError};
use crate::domain::UserIdentity;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserIdentity);

/// Token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let user = verify_within(
        state.verifier.as_ref(),
        token,
        state.settings.rooms.collaborator_timeout(),
    )
    .await
    .map_err(|e| match e {
        AuthError::Timeout => AppError::Unavailable("Token verification timed out".into()),
        AuthError::Internal(msg) => AppError::Internal(msg),
        other => AppError::Unauthorized(other.to_string()),
    })?;

    // Insert authenticated user into request extensions
    request.extensions_mut().insert(AuthUser(user));

    // Continue to the next handler
    Ok(next.run(request).await)
}
