//! Session state, events and the controller that owns them.

mod controller;
mod inner;

use serde::Serialize;
use std::fmt;

use crate::error::ErrorKind;
use crate::types::UserProfile;

pub use controller::SessionController;
pub(crate) use inner::SessionInner;

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No token is held.
    Anonymous,
    /// A login request is in flight.
    Authenticating,
    /// A token is held.
    Authenticated,
    /// The last login attempt failed; a new login may be started.
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// A read-only snapshot of the session for consumers such as a login form or
/// a route guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub state: SessionState,
    /// True iff the token store holds a token.
    pub authenticated: bool,
    pub current_user: Option<UserProfile>,
    pub last_error: Option<ErrorKind>,
}

/// Notifications published by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// A login completed.
    LoggedIn,
    /// The user logged out.
    LoggedOut,
    /// The session was ended because its token could not be renewed.
    /// Observers should send the user back to a login surface.
    Expired,
    /// The token was replaced by a refresh.
    Refreshed,
    /// The current user's profile was fetched.
    UserLoaded,
}
