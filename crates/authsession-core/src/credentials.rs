//! Login credentials type.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// Login credentials for the password flow.
///
/// This type holds the identifier (the account email) and the secret
/// (password). Credentials are never persisted; they live only for the
/// duration of a login call.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use authsession_core::Credentials;
///
/// let creds = Credentials::new("test@test.com", "password123");
/// assert_eq!(creds.identifier(), "test@test.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Arguments
    ///
    /// * `identifier` - The account email
    /// * `secret` - The account password
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Returns the identifier (email).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the secret.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Presence check: both fields must be non-empty.
    pub fn validate(&self) -> Result<(), Error> {
        if self.identifier.trim().is_empty() {
            return Err(InvalidInputError::Credentials {
                reason: "identifier is required".to_string(),
            }
            .into());
        }
        if self.secret.is_empty() {
            return Err(InvalidInputError::Credentials {
                reason: "secret is required".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// Intentionally hide the secret in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
