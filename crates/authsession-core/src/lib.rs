//! authsession-core - Client-side authentication session lifecycle.
//!
//! All authenticated state flows through a [`SessionController`]: it owns the
//! [`TokenStore`], drives login and logout, and hands out a
//! [`RequestInterceptor`] that attaches the bearer token to outgoing requests
//! and recovers from a single `401` by refreshing the token.
//!
//! Transport is abstracted behind the [`AuthApi`] trait and persistence behind
//! [`KeyValueStore`], so the state machine can be driven by any HTTP client
//! and any storage medium.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use authsession_core::{AuthApi, Credentials, SessionController, TokenStore};
//!
//! # async fn example(api: Arc<dyn AuthApi>) -> Result<(), authsession_core::Error> {
//! let controller = SessionController::new(api, TokenStore::in_memory());
//! controller
//!     .login(Credentials::new("test@test.com", "password123"))
//!     .await?;
//!
//! assert!(controller.session().authenticated);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod error;
pub mod interceptor;
pub mod memory;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::{Error, ErrorKind};
pub use interceptor::{RequestInterceptor, RetryState};
pub use memory::MemoryStore;
pub use session::{Session, SessionController, SessionEvent, SessionState};
pub use store::{TOKEN_KEY, TokenStore};
pub use tokens::{AccessToken, PersistedTokens, TokenPair};
pub use traits::{AuthApi, KeyValueStore};
pub use types::{ApiUrl, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
