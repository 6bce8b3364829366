//! HTTP client configuration.

use std::time::Duration;

use authsession_core::ApiUrl;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("authsession/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every HTTP client in this crate.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: ApiUrl,
    pub user_agent: String,
    /// Transport-level request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
