// ABOUTME: HTTP error type translating store, token, and body failures into JSON responses.
// ABOUTME: Client errors carry a `message` field; server errors carry a generic `error` field.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ratekeeper_store::StoreError;
use thiserror::Error;

use crate::token::TokenError;

/// Every failure a handler can report.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required field. Reported as a server error, matching
    /// what existing clients of this API expect.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateKey(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Validation(_) | Self::DuplicateKey(_) | Self::Internal(_) => {
                serde_json::json!({ "error": "Internal Server Error" })
            }
            Self::Unauthorized => serde_json::json!({ "message": "Unauthorized" }),
            Self::InvalidCredentials => serde_json::json!({ "message": "Invalid credentials" }),
            Self::NotFound(message) => serde_json::json!({ "message": message }),
            Self::Conflict(message) => serde_json::json!({ "message": message }),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => Self::Validation(e.to_string()),
            StoreError::DuplicateKey(username) => Self::DuplicateKey(username),
            StoreError::NotFound(_) => Self::NotFound("Data not found"),
            StoreError::AlreadyExists(id) => {
                Self::Conflict(format!("Data already exists: {}", id))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => Self::Unauthorized,
            TokenError::Signing(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected ({}): {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}
