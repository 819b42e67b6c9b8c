//! API error handling
//!
//! Errors that are raised before a request reaches the auth flow: bodies
//! that cannot be decoded and cross-origin requests from unknown origins.
//! Auth outcomes themselves are reported as page-state, see
//! `auth::service::AuthRejection` and `auth::middleware::AuthError`.
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn admission_rejected() -> Self {
        Self::new("ADMISSION_REJECTED", "Access denied")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Origin not on the allow-list; no detail is echoed back
    AdmissionRejected,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::AdmissionRejected => (StatusCode::FORBIDDEN, ApiError::admission_rejected()),
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_rejected_is_forbidden() {
        let response = AppError::AdmissionRejected.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_api_error_serialization() {
        let json = serde_json::to_value(ApiError::bad_request("bad body")).unwrap();
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["message"], "bad body");
    }
}
