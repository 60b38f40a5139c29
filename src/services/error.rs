//! Error handling utilities for route handlers
//!
//! Every failure leaves the service as `{ "error": string }`, sometimes with
//! a `data` object describing work that already happened.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use super::store::StoreError;
use super::subtitles::OperationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
    /// A later step failed after earlier steps were persisted
    #[error("{message}")]
    Partial { message: String, data: Value },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Partial { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Partial { message, data } => json!({ "error": message, "data": data }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<OperationError> for ApiError {
    fn from(e: OperationError) -> Self {
        match e {
            OperationError::Store(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Extension trait for logging errors and converting to `ApiError`
pub trait LogErr<T> {
    /// Log with context at a level matching the outcome, then convert
    fn log_err(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: Into<ApiError>> LogErr<T> for Result<T, E> {
    fn log_err(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            let err = e.into();
            match &err {
                ApiError::Internal(_) | ApiError::Partial { .. } => {
                    tracing::error!("{}: {}", context, err)
                }
                _ => tracing::debug!("{}: {}", context, err),
            }
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_error_envelope() {
        let (status, body) = body_json(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));

        let (status, body) = body_json(ApiError::BadRequest("Invalid input".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid input" }));
    }

    #[tokio::test]
    async fn partial_failure_carries_data() {
        let (status, body) = body_json(ApiError::Partial {
            message: "boom".into(),
            data: json!({ "subtitleId": "abc" }),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "boom");
        assert_eq!(body["data"]["subtitleId"], "abc");
    }

    #[test]
    fn operation_errors_map_by_kind() {
        let err: ApiError = OperationError::InvalidFormat.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = OperationError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "down");
    }

    #[test]
    fn log_err_converts() {
        let result: Result<(), StoreError> = Err(StoreError::Unavailable("db gone".into()));
        let err = result.log_err("Insert subtitle").unwrap_err();
        assert!(matches!(err, ApiError::Internal(ref m) if m == "db gone"));
    }
}
