//! Bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs signed with a process-wide shared secret. The
//! service is stateless: every method is a pure function of its inputs, the
//! configured key and TTL, and the clock.

use std::collections::HashSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde_json::{Map, Value};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{AuthError, Claims, Identity};

/// Minimum decoded signing key length for HS256.
pub const MIN_KEY_BYTES: usize = 32;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TTL_MILLIS: i64 = 86_400_000;

/// Current time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

/// Signing key and lifetime for issued tokens.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenConfig {
    /// Base64-encoded shared secret.
    pub signing_key: String,
    /// Token lifetime in milliseconds. Zero or negative issues expired tokens.
    pub ttl_millis: i64,
}

impl TokenConfig {
    /// Creates a configuration from a base64 secret and a TTL.
    pub fn new(signing_key: impl Into<String>, ttl_millis: i64) -> Self {
        Self {
            signing_key: signing_key.into(),
            ttl_millis,
        }
    }

    /// Generates a random base64-encoded 64-byte signing key.
    pub fn generate_signing_key() -> String {
        let mut bytes = Zeroizing::new([0u8; 64]);
        OsRng.fill_bytes(&mut *bytes);
        STANDARD.encode(&*bytes)
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &"<redacted>")
            .field("ttl_millis", &self.ttl_millis)
            .finish()
    }
}

/// Issues and validates bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_millis: i64,
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the signing key is not valid
    /// base64 or decodes to fewer than [`MIN_KEY_BYTES`] bytes.
    pub fn new(config: &TokenConfig) -> Result<Self, AuthError> {
        let secret = Zeroizing::new(
            STANDARD
                .decode(config.signing_key.trim())
                .map_err(|e| AuthError::Configuration(format!("signing key is not base64: {e}")))?,
        );

        if secret.len() < MIN_KEY_BYTES {
            return Err(AuthError::Configuration(format!(
                "signing key must be at least {MIN_KEY_BYTES} bytes, got {}",
                secret.len()
            )));
        }

        // Expiry is checked by `is_token_valid`, not at decode time, so that
        // an expired token still yields its claims.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims =
            HashSet::from(["sub".to_string(), "exp".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            ttl_millis: config.ttl_millis,
        })
    }

    /// Configured token lifetime in milliseconds.
    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    /// Issues a token for `identity` with no extra claims.
    pub fn generate_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.generate_token_with_claims(identity, Map::new())
    }

    /// Issues a token for `identity`, merging `extra` into the payload.
    ///
    /// Extra claims named `sub`, `iat` or `exp` are ignored.
    pub fn generate_token_with_claims(
        &self,
        identity: &Identity,
        extra: Map<String, Value>,
    ) -> Result<String, AuthError> {
        let now = now_millis();
        let issued_at = now.div_euclid(1000);
        let expires_at = now.saturating_add(self.ttl_millis).div_euclid(1000);

        let claims = Claims::new(identity.email.clone(), issued_at, expires_at, extra);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Configuration(format!("token signing failed: {e}")))
    }

    /// Decodes and verifies a token, returning its claims.
    ///
    /// Expiry is not checked here.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenMalformed`] if the token cannot be parsed or
    /// its signature does not match the configured key.
    pub fn extract_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenMalformed(e.to_string()))
    }

    /// Projects a single value out of a token's claims.
    pub fn extract_claim<T, F>(&self, token: &str, select: F) -> Result<T, AuthError>
    where
        F: FnOnce(&Claims) -> T,
    {
        self.extract_claims(token).map(|claims| select(&claims))
    }

    /// Returns the token subject (the identity email).
    pub fn extract_username(&self, token: &str) -> Result<String, AuthError> {
        self.extract_claim(token, |claims| claims.subject().to_string())
    }

    /// Checks that `token` belongs to `identity` and has not expired.
    ///
    /// Expired or mismatched tokens return `Ok(false)`; a malformed or forged
    /// token returns the extraction error.
    pub fn is_token_valid(&self, token: &str, identity: &Identity) -> Result<bool, AuthError> {
        let claims = self.extract_claims(token)?;
        Ok(claims.subject() == identity.email && !claims.is_expired_at(now_millis()))
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_millis", &self.ttl_millis)
            .finish_non_exhaustive()
    }
}
