//! authsession-http - HTTP transport for authsession.
//!
//! [`HttpAuthClient`] implements [`AuthApi`](authsession_core::AuthApi)
//! against the REST API, and [`AuthorizedClient`] runs arbitrary `reqwest`
//! requests through a session's
//! [`RequestInterceptor`](authsession_core::RequestInterceptor).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use authsession_core::{ApiUrl, Credentials, SessionController, TokenStore};
//! use authsession_http::{AuthorizedClient, ClientConfig, HttpAuthClient};
//!
//! # async fn example() -> Result<(), authsession_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://api.example.com")?);
//! let api = Arc::new(HttpAuthClient::new(&config)?);
//! let controller = SessionController::new(api, TokenStore::in_memory());
//!
//! controller
//!     .login(Credentials::new("test@test.com", "password123"))
//!     .await?;
//!
//! let client = AuthorizedClient::new(&config, &controller)?;
//! let items: serde_json::Value = client.get_json("/api/v1/items/").await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod auth_client;
mod authorized;
mod config;

pub use api::endpoints::{LOGIN_ACCESS_TOKEN, LOGIN_REFRESH_TOKEN, USERS_ME};
pub use auth_client::HttpAuthClient;
pub use authorized::AuthorizedClient;
pub use config::ClientConfig;
