//! API error types and their HTTP mapping.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use fintrack_auth::AuthError;

use crate::handlers::json_field;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication layer error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request body failed field validation.
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    /// Request body could not be parsed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The endpoint requires an authenticated principal.
    #[error("authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::UserNotFound(_))
            | ApiError::Auth(AuthError::InvalidCredentials)
            | ApiError::Auth(AuthError::TokenMalformed(_))
            | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Flattens validation errors into `{field: message}`, keyed by JSON name.
fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (json_field(&field).to_string(), message)
            })
        })
        .collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Validation(errors) => json!(field_messages(errors)),
            ApiError::Auth(AuthError::UserNotFound(_) | AuthError::InvalidCredentials) => {
                json!({ "error": "invalid credentials" })
            },
            ApiError::Auth(AuthError::DuplicateEmail(_)) => {
                json!({ "error": "email already registered" })
            },
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %self, "Request failed");
                json!({ "error": format!("internal error: {self}") })
            },
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
