//! Persisted identity row.

use serde::{Deserialize, Serialize};

/// Identity as stored by a repository.
///
/// The role is kept in its textual form (`"USER"`, `"ADMIN"`); mapping it to
/// a typed role is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Argon2id PHC hash string.
    pub password_hash: String,
    /// Role name.
    pub role: String,
    /// Creation time (Unix seconds).
    pub created_at: i64,
}
