//! Per-request authentication gate.
//!
//! The gate reads the `Authorization` header and, when it carries a valid
//! bearer token for a known identity, installs the matching principal into
//! the request's [`SecurityContext`]. It never rejects a request: every
//! outcome except a credential store failure lets the request continue,
//! authenticated or anonymous. Access control belongs to later stages.

use std::sync::Arc;

use tracing::debug;

use crate::{AuthError, CredentialStore, Principal, SecurityContext, TokenService};

/// Authorization scheme prefix, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// How the gate handled a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// No `Authorization` header.
    NoHeader,
    /// Header present but not `Bearer <token>`.
    MalformedHeader,
    /// Token could not be parsed or verified.
    MalformedToken,
    /// The context already held a principal; nothing was looked up.
    AlreadyAuthenticated,
    /// Token subject is not a registered identity.
    UnknownIdentity,
    /// Token is expired or does not belong to the identity.
    InvalidToken,
    /// Principal installed.
    Authenticated,
}

impl GateOutcome {
    /// Whether the request leaves the gate with a principal.
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::AlreadyAuthenticated)
    }
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Resolves bearer tokens into principals.
#[derive(Clone)]
pub struct AuthenticationGate {
    tokens: Arc<TokenService>,
    store: Arc<dyn CredentialStore>,
}

impl AuthenticationGate {
    /// Creates a gate over a token service and a credential store.
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    /// Runs the gate for one request.
    ///
    /// # Errors
    ///
    /// Only credential store failures are returned; the caller decides how
    /// to surface them. Every other path yields `Ok`.
    pub async fn resolve(
        &self,
        authorization: Option<&str>,
        ctx: &mut SecurityContext,
    ) -> Result<GateOutcome, AuthError> {
        let Some(header) = authorization else {
            return Ok(GateOutcome::NoHeader);
        };

        let Some(token) = bearer_token(header) else {
            debug!("Authorization header is not a bearer token");
            return Ok(GateOutcome::MalformedHeader);
        };

        let subject = match self.tokens.extract_username(token) {
            Ok(subject) => subject,
            Err(e) => {
                debug!(error = %e, "Rejected bearer token");
                return Ok(GateOutcome::MalformedToken);
            },
        };

        if ctx.is_authenticated() {
            return Ok(GateOutcome::AlreadyAuthenticated);
        }

        let Some(identity) = self.store.find_by_email(&subject).await? else {
            debug!(subject = %subject, "Token subject is not a registered identity");
            return Ok(GateOutcome::UnknownIdentity);
        };

        match self.tokens.is_token_valid(token, &identity) {
            Ok(true) => {},
            Ok(false) => {
                debug!(subject = %subject, "Token expired or subject mismatch");
                return Ok(GateOutcome::InvalidToken);
            },
            Err(e) => {
                debug!(subject = %subject, error = %e, "Token validation failed");
                return Ok(GateOutcome::InvalidToken);
            },
        }

        ctx.authenticate(Principal::from_identity(&identity));
        debug!(subject = %subject, role = %identity.role, "Request authenticated");

        Ok(GateOutcome::Authenticated)
    }
}
