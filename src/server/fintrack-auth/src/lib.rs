//! # Fintrack Auth
//!
//! Stateless bearer-token authentication for Fintrack.
//!
//! ## Components
//!
//! - [`TokenService`] - HS256 token issuance and validation
//! - [`AuthenticationGate`] - per-request principal resolution
//! - [`CredentialStore`] - identity lookup and password verification
//! - [`authorities_for`] - role to authority mapping
//! - [`AuthService`] - login and registration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod context;
pub mod error;
pub mod gate;
pub mod identity;
pub mod password;
pub mod role;
pub mod service;
pub mod store;
pub mod token;

pub use claims::Claims;
pub use context::{Principal, SecurityContext};
pub use error::AuthError;
pub use gate::{AuthenticationGate, GateOutcome};
pub use identity::Identity;
pub use role::{authorities_for, Authority, Role};
pub use service::{AuthResponse, AuthService};
pub use store::{CredentialStore, RepositoryCredentialStore};
pub use token::{TokenConfig, TokenService};
