//! Mapping from lakehouse failures to HTTP responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contact_lakehouse::{ErrorKind, LakehouseError};
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

pub const MSG_TOKEN_INVALID: &str = "Token is invalid!";
pub const MSG_ROLE_NOT_AUTHORIZED: &str = "role not authorized!";
pub const MSG_NOT_FOUND: &str = "Message not found";
pub const MSG_INTERNAL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Lakehouse(#[from] LakehouseError),

    #[error("Malformed request body: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str, Option<String>) {
        let err = match self {
            ApiError::BadRequest(detail) => {
                return (StatusCode::BAD_REQUEST, "Invalid request", Some(detail.clone()))
            }
            ApiError::Lakehouse(err) => err,
        };

        // 401 for role failures as well as token failures
        match err.kind() {
            ErrorKind::Unauthenticated => (StatusCode::UNAUTHORIZED, MSG_TOKEN_INVALID, None),
            ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, MSG_ROLE_NOT_AUTHORIZED, None),
            ErrorKind::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password", None)
            }
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, MSG_NOT_FOUND, None),
            ErrorKind::InvalidInput => {
                (StatusCode::BAD_REQUEST, "Invalid request", Some(err.to_string()))
            }
            ErrorKind::Conflict => (StatusCode::CONFLICT, "User already exists", None),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL, None),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message, detail) = self.status_and_message();
        if code == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        }
        ApiResponse::failure(code, message, detail).into_response()
    }
}
