//! Credential store: identity lookup, creation and password verification.

use async_trait::async_trait;

use fintrack_storage::{IdentityRecord, IdentityRepository};

use crate::{password, AuthError, Identity};

/// Identity lookup and password verification.
///
/// Implementations may perform blocking or remote I/O. Infrastructure
/// failures are reported as [`AuthError::Storage`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds an identity by its email.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(identity))` - If the email is registered
    /// * `Ok(None)` - If it is not
    /// * `Err(AuthError)` - If the lookup itself failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError>;

    /// Persists a new identity.
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is already taken.
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError>;

    /// Checks `plaintext` against a stored Argon2id hash.
    fn verify_password(&self, plaintext: &str, stored_hash: &str) -> bool {
        password::verify_password(plaintext, stored_hash)
    }
}

/// [`CredentialStore`] backed by an [`IdentityRepository`].
pub struct RepositoryCredentialStore<R> {
    repository: R,
}

impl<R: IdentityRepository> RepositoryCredentialStore<R> {
    /// Wraps a repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: IdentityRepository> CredentialStore for RepositoryCredentialStore<R> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        self.repository
            .find_by_email(email)
            .await?
            .map(Identity::try_from)
            .transpose()
    }

    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        self.repository
            .insert(&IdentityRecord::from(&identity))
            .await?;
        Ok(identity)
    }
}
