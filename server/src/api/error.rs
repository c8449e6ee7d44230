//! API Error types
//!
//! Every failure leaves the server as `{ "error": ..., "code": ... }`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{DomainError, Filament};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Filaments blocking a vocabulary delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filaments: Option<Vec<Filament>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, filaments) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Domain(DomainError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg, None)
            }
            ApiError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None)
            }
            ApiError::Domain(DomainError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg, None)
            }
            ApiError::Domain(DomainError::InUse(msg, blockers)) => {
                (StatusCode::CONFLICT, "IN_USE", msg, Some(blockers))
            }
            ApiError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            filaments,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("q".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (DomainError::InvalidInput("x".into()).into(), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (DomainError::NotFound("x".into()).into(), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (DomainError::Conflict("x".into()).into(), StatusCode::CONFLICT, "CONFLICT"),
            (DomainError::Internal("x".into()).into(), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            let (got, body) = render(err).await;
            assert_eq!(got, status);
            assert_eq!(body["code"], code);
            assert!(body.get("filaments").is_none());
        }
    }

    #[tokio::test]
    async fn test_in_use_carries_blockers() {
        let (status, body) = render(DomainError::InUse("Custom brand 'X' is used".into(), vec![]).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "IN_USE");
        assert_eq!(body["error"], "Custom brand 'X' is used");
        assert!(body["filaments"].is_array());
    }
}
