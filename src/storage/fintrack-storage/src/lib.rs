//! # Fintrack Storage
//!
//! Storage abstraction layer for Fintrack identity records.
//!
//! Provides the repository trait and row types that concrete backends
//! (see `fintrack-storage-sqlite`) implement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod record;

pub use backend::IdentityRepository;
pub use error::StorageError;
pub use record::IdentityRecord;
