//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication.
///
/// An expired token is not an error: [`crate::TokenService::is_token_valid`]
/// reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token could not be parsed or its signature does not verify.
    #[error("malformed token: {0}")]
    TokenMalformed(String),

    /// No identity is registered under the given email.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration would violate email uniqueness.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// Signing key or TTL configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<fintrack_storage::StorageError> for AuthError {
    fn from(e: fintrack_storage::StorageError) -> Self {
        match e {
            fintrack_storage::StorageError::AlreadyExists(email) => AuthError::DuplicateEmail(email),
            other => AuthError::Storage(other.to_string()),
        }
    }
}
