//! Token claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim names owned by the token service. Extra claims never override them.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Payload of a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity email).
    sub: String,
    /// Issued at (Unix seconds).
    iat: i64,
    /// Expiration (Unix seconds).
    exp: i64,
    /// Caller-supplied extra claims.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Claims {
    /// Builds claims, dropping any extra claim that uses a reserved name.
    pub(crate) fn new(sub: String, iat: i64, exp: i64, mut extra: Map<String, Value>) -> Self {
        extra.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));
        Self {
            sub,
            iat,
            exp,
            extra,
        }
    }

    /// Subject of the token.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Issue time in Unix seconds.
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Expiration time in Unix seconds.
    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Returns an extra claim by name.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Whether the token has expired at `now_millis`.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.exp.saturating_mul(1000)
    }
}
