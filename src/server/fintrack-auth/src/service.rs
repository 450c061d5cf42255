//! Login and registration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{info, warn};

use crate::{password, AuthError, CredentialStore, Identity, Role, TokenService};

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed bearer token.
    pub token: String,
    /// Email of the authenticated identity.
    pub email: String,
    /// Display name of the authenticated identity.
    pub display_name: String,
}

/// Verifies or creates identities and mints tokens for them.
#[derive(Clone)]
pub struct AuthService {
    tokens: Arc<TokenService>,
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    /// Creates the service.
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    /// Authenticates with email and password.
    ///
    /// An unknown email still pays for one password verification against
    /// [`password::DUMMY_HASH`].
    ///
    /// # Errors
    ///
    /// * [`AuthError::UserNotFound`] - No identity with this email
    /// * [`AuthError::InvalidCredentials`] - Wrong password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let Some(identity) = self.store.find_by_email(email).await? else {
            self.verify(password, password::DUMMY_HASH).await?;
            warn!(email = %email, "Login failed: unknown email");
            return Err(AuthError::UserNotFound(email.to_string()));
        };

        if !self.verify(password, &identity.password_hash).await? {
            warn!(email = %email, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(email = %email, "User logged in");
        self.respond(&identity)
    }

    /// Registers a new identity with [`Role::User`] and logs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is already taken.
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        let plaintext = password.to_string();
        let password_hash = task::spawn_blocking(move || password::hash_password(&plaintext))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("blocking task failed: {e}")))??;
        let identity = Identity::new(email, display_name, password_hash, Role::User);

        let identity = self.store.create(identity).await?;

        info!(email = %identity.email, "User registered");
        self.respond(&identity)
    }

    /// Runs the store's password check on the blocking pool.
    async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let store = Arc::clone(&self.store);
        let plaintext = password.to_string();
        let stored_hash = stored_hash.to_string();

        task::spawn_blocking(move || store.verify_password(&plaintext, &stored_hash))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("blocking task failed: {e}")))
    }

    fn respond(&self, identity: &Identity) -> Result<AuthResponse, AuthError> {
        Ok(AuthResponse {
            token: self.tokens.generate_token(identity)?,
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
        })
    }
}
