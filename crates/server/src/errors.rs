use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::AuthError;
use thiserror::Error;
use tracing::{error, info};

/// JSON error body: `{"message": ..., "more": ...}`.
#[derive(Debug, Serialize)]
pub struct GenericError {
    pub message: String,
    pub more: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: GenericError,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, body: GenericError { message: message.into(), more: None } }
    }

    pub fn malformed_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "can't parse body to json")
    }

    /// 400 carrying one message per offending field.
    pub fn field_errors(fields: BTreeMap<String, String>) -> Self {
        let mut e = Self::new(StatusCode::BAD_REQUEST, "FieldError");
        e.body.more = Some(serde_json::json!(fields));
        e
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken | AuthError::UsernameTaken | AuthError::PasswordMismatch => StatusCode::BAD_REQUEST,
            AuthError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if e.is_client_error() {
            info!(code = e.code(), error = %e, "auth request rejected");
            return ApiError::new(status, e.to_string());
        }
        match &e {
            AuthError::Internal(detail) => {
                error!(code = e.code(), error = %detail, "auth request failed");
                ApiError::new(status, "internal server error")
            }
            _ => {
                error!(code = e.code(), error = %e, "auth request failed");
                ApiError::new(status, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
