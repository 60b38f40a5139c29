//! JSON body extractor with schema validation

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::constants::INVALID_INPUT_MESSAGE;
use crate::services::error::ApiError;

/// Parses the body as JSON whatever its `Content-Type`, then runs
/// `T::validate`. Any failure is a 400 `Invalid input` envelope.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Failed to read request body: {}", e);
            ApiError::BadRequest(INVALID_INPUT_MESSAGE.to_string())
        })?;

        let value: T = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            ApiError::BadRequest(INVALID_INPUT_MESSAGE.to_string())
        })?;

        value.validate().map_err(|e| {
            tracing::debug!("Request body failed validation: {}", e);
            ApiError::BadRequest(INVALID_INPUT_MESSAGE.to_string())
        })?;

        Ok(Self(value))
    }
}
