//! Identity type and its mapping to storage records.

use std::fmt;

use fintrack_storage::IdentityRecord;

use crate::{AuthError, Role};

/// An account that can authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique email address, used as the token subject.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Argon2id PHC hash of the password.
    pub password_hash: String,
    /// Role of the identity.
    pub role: Role,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}

impl Identity {
    /// Creates an identity with the current time as creation timestamp.
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            password_hash: password_hash.into(),
            role,
            created_at: crate::token::now_millis() / 1000,
        }
    }
}

// Keeps the hash out of logs.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = AuthError;

    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            role: record.role.parse()?,
            email: record.email,
            display_name: record.display_name,
            password_hash: record.password_hash,
            created_at: record.created_at,
        })
    }
}

impl From<&Identity> for IdentityRecord {
    fn from(identity: &Identity) -> Self {
        IdentityRecord {
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            password_hash: identity.password_hash.clone(),
            role: identity.role.as_str().to_string(),
            created_at: identity.created_at,
        }
    }
}
