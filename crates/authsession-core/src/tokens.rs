//! Token types for bearer authentication.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only token type the API issues.
pub const BEARER: &str = "bearer";

/// An access token for authenticated requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting
    /// the session.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// An issued access token together with its type.
///
/// A pair is immutable: a refresh replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    access_token: AccessToken,
    token_type: String,
}

impl TokenPair {
    /// Create a pair from an access token and the token type reported by the server.
    pub fn new(access_token: AccessToken, token_type: impl Into<String>) -> Self {
        Self {
            access_token,
            token_type: token_type.into(),
        }
    }

    /// Create a bearer pair.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self::new(AccessToken::new(access_token), BEARER)
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token.as_str())
    }
}

/// The record written to the key-value store so a session survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTokens {
    pub access_token: String,
    pub token_type: String,
    pub saved_at: DateTime<Utc>,
}

impl PersistedTokens {
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.as_str().to_string(),
            token_type: pair.token_type.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn into_pair(self) -> TokenPair {
        TokenPair::new(AccessToken::new(self.access_token), self.token_type)
    }
}
