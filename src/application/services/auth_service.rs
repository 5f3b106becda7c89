//! Authentication Service
//!
//! Verifies the bearer token presented on the WebSocket handshake and the
//! room-management API. Token issuance lives with the external identity
//! provider; `issue_token` exists for tooling and tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::UserIdentity;

/// Token verification seam, injected into the gateway and HTTP extractors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer token to the identity it was issued for.
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError>;
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name; falls back to the subject when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl From<Claims> for UserIdentity {
    fn from(claims: Claims) -> Self {
        let username = claims
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| claims.sub.clone());
        Self {
            user_id: claims.sub,
            username,
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token verification timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// HS256 verifier backed by the shared secret in `JwtSettings`.
#[derive(Clone)]
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenVerifier").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.decode_claims(token).map(UserIdentity::from)
    }
}

/// Run `verifier` under the collaborator timeout.
pub async fn verify_within(
    verifier: &dyn TokenVerifier,
    token: &str,
    limit: std::time::Duration,
) -> Result<UserIdentity, AuthError> {
    tokio::time::timeout(limit, verifier.verify(token))
        .await
        .map_err(|_| AuthError::Timeout)?
}

/// Sign an HS256 token for `user_id`, valid for `ttl`.
pub fn issue_token(
    secret: &str,
    user_id: &str,
    username: Option<&str>,
    ttl: Duration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.map(str::to_string),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
}
