//! The authenticated user's profile.

use serde::{Deserialize, Serialize};

/// Profile of the currently authenticated user, as returned by `/users/me`.
///
/// Cached by the controller for the lifetime of a session and discarded on
/// logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(rename = "full_name", default)]
    pub display_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// The name to greet the user with, falling back to the email.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.email.as_str())
    }
}
