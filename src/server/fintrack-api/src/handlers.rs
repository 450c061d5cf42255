//! HTTP handlers for authentication endpoints.

use axum::{
    extract::{FromRequest, Request, State},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use fintrack_auth::{AuthResponse, Principal};

use crate::{error::ApiError, middleware::Authenticated, AppState};

/// JSON body that is deserialized and then validated.
///
/// Parse failures and validation failures both answer 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Request body names of validated fields, where they differ from the Rust
/// field name. Must follow the `rename_all` attributes below.
const JSON_FIELD_NAMES: &[(&str, &str)] = &[("display_name", "displayName")];

/// Maps a Rust field name to its name in request bodies.
pub(crate) fn json_field(field: &str) -> &str {
    JSON_FIELD_NAMES
        .iter()
        .find(|&&(rust, _)| rust == field)
        .map_or(field, |&(_, json)| json)
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address; becomes the login identifier.
    #[validate(
        email(message = "must be a valid email"),
        length(max = 120, message = "must be at most 120 characters")
    )]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, max = 120, message = "must be between 1 and 120 characters"))]
    pub display_name: String,
    /// Plaintext password.
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state
        .auth
        .register(&req.email, &req.display_name, &req.password)
        .await?;
    Ok(Json(response))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(response))
}

/// `GET /api/auth/me`
pub async fn me(Authenticated(principal): Authenticated) -> Json<Principal> {
    Json(principal)
}

/// Fallback for unknown routes.
pub async fn not_found(req: Request) -> ApiError {
    ApiError::NotFound(format!("no route for {} {}", req.method(), req.uri().path()))
}
