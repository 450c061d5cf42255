//! Authentication middleware and principal extractors for Axum.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use fintrack_auth::{Principal, SecurityContext};

use crate::{error::ApiError, AppState};

/// Runs the authentication gate for every request.
///
/// The request always proceeds; a valid bearer token only adds a principal
/// to the [`SecurityContext`] stored in the request extensions. The one
/// exception is a credential store failure, which ends the request with a
/// 500 response.
pub async fn authentication_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    // A header that is not valid UTF-8 is treated as malformed, not absent.
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default().to_owned());

    let mut ctx = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();

    match state.gate.resolve(authorization.as_deref(), &mut ctx).await {
        Ok(outcome) => {
            debug!(?outcome, path = %req.uri().path(), "Authentication gate passed");
        },
        Err(e) => {
            error!(error = %e, "Credential store unavailable");
            return ApiError::from(e).into_response();
        },
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

fn principal_from(parts: &Parts) -> Option<Principal> {
    parts
        .extensions
        .get::<SecurityContext>()
        .and_then(SecurityContext::principal)
        .cloned()
}

/// Extractor that requires an authenticated principal.
///
/// This is the downstream access check that pairs with the permissive gate:
/// handlers taking it answer 401 to anonymous requests.
///
/// # Example
///
/// ```ignore
/// async fn handler(Authenticated(principal): Authenticated) -> impl IntoResponse {
///     principal.email
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from(parts)
            .map(Authenticated)
            .ok_or(ApiError::Unauthorized)
    }
}
