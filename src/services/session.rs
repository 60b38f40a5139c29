//! Session lookup: JWT access tokens carried in the session cookie
//!
//! Sessions are issued elsewhere; this service only needs to know whether
//! the caller holds a valid one.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::auth::RequestContext;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,    // expiry timestamp
    pub iat: i64,    // issued at
}

/// An authenticated user session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    Expired,
}

/// Resolves the current session, if any, from a request
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self, ctx: &RequestContext) -> Option<Session>;
}

/// Validates HS256 access tokens with a shared secret
#[derive(Clone)]
pub struct JwtSessions {
    secret: Vec<u8>,
}

impl JwtSessions {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessions {
    async fn current_session(&self, ctx: &RequestContext) -> Option<Session> {
        let token = ctx.session_token.as_deref()?;

        match validate_access_token(token, &self.secret) {
            Ok(user_id) => Some(Session { user_id }),
            Err(e) => {
                // Stale cookies are routine; fall through to API key auth
                tracing::debug!("Session cookie rejected: {}", e);
                None
            }
        }
    }
}

/// Create a JWT access token for `user_id`, valid for `ttl`
pub fn create_access_token(
    user_id: &str,
    secret: &[u8],
    ttl: Duration,
) -> Result<String, SessionError> {
    let now = Utc::now();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| SessionError::InvalidToken)
}

/// Validate a JWT access token and return the user id
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<String, SessionError> {
    // HS256 only, to rule out algorithm confusion
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub", "iat"]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::InvalidToken,
        })?;

    if token_data.claims.sub.is_empty() {
        return Err(SessionError::InvalidToken);
    }

    Ok(token_data.claims.sub)
}
