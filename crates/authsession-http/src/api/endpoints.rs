//! Endpoint paths and wire types.

use serde::{Deserialize, Serialize};

/// `POST` form login.
pub const LOGIN_ACCESS_TOKEN: &str = "/api/v1/login/access-token";

/// `POST` token refresh, authorized with the current token.
pub const LOGIN_REFRESH_TOKEN: &str = "/api/v1/login/refresh-token";

/// `GET` the authenticated user.
pub const USERS_ME: &str = "/api/v1/users/me";

/// Detail the API uses for a deactivated account.
pub(crate) const INACTIVE_USER: &str = "Inactive user";

/// Detail the API uses for an undecodable or expired token.
pub(crate) const COULD_NOT_VALIDATE: &str = "Could not validate credentials";

/// Form body for the password login. `username` carries the email.
#[derive(Serialize)]
pub(crate) struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the login and refresh endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// FastAPI error body: `detail` is a string, or a list of validation errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Flatten `detail` into one message.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}
