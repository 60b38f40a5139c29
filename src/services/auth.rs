//! Authorization gate: session cookie OR API key
//!
//! The gate never fails. Lookup errors come back as `is_allowed: false`
//! with the error message attached so callers can log it.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::CookieJar;

use super::session::SessionProvider;
use super::store::Store;
use crate::constants::SESSION_COOKIE_NAME;

/// The parts of a request the gate looks at
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Value of the session cookie
    pub session_token: Option<String>,
    /// Raw `Authorization` header
    pub authorization: Option<String>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let session_token = CookieJar::from_headers(headers)
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string());

        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            session_token,
            authorization,
        }
    }
}

/// Outcome of the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub is_allowed: bool,
    pub error: Option<String>,
}

impl Authorization {
    fn allowed() -> Self {
        Self {
            is_allowed: true,
            error: None,
        }
    }

    fn denied() -> Self {
        Self {
            is_allowed: false,
            error: None,
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            is_allowed: false,
            error: Some(error.to_string()),
        }
    }

    /// Allowed and no error along the way
    pub fn is_granted(&self) -> bool {
        self.is_allowed && self.error.is_none()
    }
}

/// Decide whether the caller may use a protected endpoint
pub async fn is_user_allowed(
    store: &dyn Store,
    sessions: &dyn SessionProvider,
    ctx: &RequestContext,
) -> Authorization {
    if let Some(session) = sessions.current_session(ctx).await {
        tracing::debug!(user_id = %session.user_id, "Authorized by session");
        return Authorization::allowed();
    }

    let Some(header) = ctx.authorization.as_deref() else {
        return Authorization::denied();
    };

    let Some(key) = api_key_from_header(header) else {
        return Authorization::denied();
    };

    match store.find_api_key(key).await {
        Ok(Some(_)) => {
            tracing::debug!("Authorized by API key");
            Authorization::allowed()
        }
        Ok(None) => Authorization::denied(),
        Err(e) => Authorization::failed(e),
    }
}

/// Strip an optional scheme (`Bearer abc` -> `abc`, `abc` -> `abc`).
/// Only the first token after the scheme is the key.
pub fn api_key_from_header(header: &str) -> Option<&str> {
    let mut tokens = header.split_whitespace();
    let first = tokens.next()?;

    match tokens.next() {
        Some(key) => Some(key),
        None if header.trim_start().len() > first.len() => None,
        None => Some(first),
    }
}
