//! Request authorization for protected endpoints

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::AppState;
use crate::services::auth::{self, RequestContext};
use crate::services::error::ApiError;

// ============================================================================
// Auth Extractor - session cookie or API key
// ============================================================================

/// Extractor that runs the authorization gate before the handler body.
/// Place it ahead of any body extractor so unauthorized requests are never parsed.
pub struct Authorized;

impl FromRequestParts<Arc<AppState>> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_headers(&parts.headers);

        let decision =
            auth::is_user_allowed(state.store.as_ref(), state.sessions.as_ref(), &ctx).await;

        // The response never says why; the log does
        if let Some(error) = &decision.error {
            tracing::warn!("Authorization check failed: {}", error);
        }

        if !decision.is_granted() {
            return Err(ApiError::Unauthorized);
        }

        Ok(Authorized)
    }
}
