//! Role model: maps an identity's role to its authorities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Role of an identity. Every identity has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular account.
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Persisted name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AuthError::Storage(format!("unknown role: {other}"))),
        }
    }
}

/// A coarse permission label granted to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(&'static str);

impl Authority {
    /// Authority held by [`Role::User`].
    pub const USER: Authority = Authority("ROLE_USER");
    /// Authority held by [`Role::Admin`].
    pub const ADMIN: Authority = Authority("ROLE_ADMIN");

    /// Label of this authority.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Returns the authorities granted to `role`.
///
/// One authority per role, no hierarchy.
pub fn authorities_for(role: Role) -> &'static [Authority] {
    match role {
        Role::User => &[Authority::USER],
        Role::Admin => &[Authority::ADMIN],
    }
}
