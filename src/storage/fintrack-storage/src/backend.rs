//! Identity repository trait definition.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::IdentityRecord;

/// Repository trait for persisting identity records.
///
/// Email is the natural key: implementations must reject a second record
/// with an email that already exists.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Get an identity by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, StorageError>;

    /// Insert a new identity.
    ///
    /// Returns [`StorageError::AlreadyExists`] if the email is taken.
    async fn insert(&self, record: &IdentityRecord) -> Result<(), StorageError>;
}
