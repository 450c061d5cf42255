//! Per-request security context.

use serde::Serialize;

use crate::{authorities_for, Authority, Identity, Role};

/// Authenticated principal: an identity plus the authorities its role grants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Email address (token subject).
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Role of the identity.
    pub role: Role,
    /// Authorities derived from the role.
    pub authorities: Vec<Authority>,
}

impl Principal {
    /// Builds the principal for `identity`.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            role: identity.role,
            authorities: authorities_for(identity.role).to_vec(),
        }
    }

    /// Checks whether the principal holds `authority`.
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}

/// Security context of a single request.
///
/// Holds at most one principal. It is created when the request starts, set
/// at most once by the gate, and dropped with the request.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    /// Creates an anonymous context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the authenticated principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Checks if a principal has been installed.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Installs `principal` unless one is already present.
    ///
    /// Returns `false` and leaves the context untouched if it was already
    /// authenticated.
    pub fn authenticate(&mut self, principal: Principal) -> bool {
        if self.principal.is_some() {
            return false;
        }
        self.principal = Some(principal);
        true
    }
}
