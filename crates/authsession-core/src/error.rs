//! Error types for authsession.
//!
//! [`Error`] carries the full failure detail for callers; [`ErrorKind`] is the
//! plain discriminant recorded in [`Session::last_error`](crate::Session) for
//! display by a login form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The unified error type for authsession operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The server rejected the submitted identifier and secret.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("inactive user")]
    InactiveUser,

    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The server answered with a status or body this client does not understand.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(#[from] ResponseError),

    /// The access token was missing, invalid or expired.
    #[error("unauthorized")]
    Unauthorized,

    /// The token is valid but lacks the privileges for the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The server declined to renew the token.
    #[error("refresh rejected by server")]
    RefreshRejected,

    /// The session ended because the token could not be renewed.
    #[error("session expired")]
    SessionExpired,

    /// A login attempt is already running.
    #[error("login already in progress")]
    AlreadyInProgress,

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The persistence collaborator failed.
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCredentials => ErrorKind::InvalidCredentials,
            Error::InactiveUser => ErrorKind::InactiveUser,
            Error::Network(_) => ErrorKind::NetworkError,
            Error::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            Error::Unauthorized => ErrorKind::Unauthorized,
            Error::Forbidden(_) => ErrorKind::Forbidden,
            Error::RefreshRejected => ErrorKind::RefreshRejected,
            Error::SessionExpired => ErrorKind::SessionExpired,
            Error::AlreadyInProgress => ErrorKind::AlreadyInProgress,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Returns true if the error means the session can no longer be used.
    pub fn ends_session(&self) -> bool {
        matches!(self, Error::RefreshRejected | Error::SessionExpired)
    }

    /// Returns true if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

/// The kind of an [`Error`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCredentials,
    InactiveUser,
    NetworkError,
    UnexpectedResponse,
    Unauthorized,
    Forbidden,
    RefreshRejected,
    SessionExpired,
    AlreadyInProgress,
    InvalidInput,
    Storage,
}

impl ErrorKind {
    /// A short message suitable for showing next to a login form.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCredentials => "Incorrect email or password",
            ErrorKind::InactiveUser => "This account is inactive",
            ErrorKind::NetworkError => "Could not reach the server, please try again",
            ErrorKind::Unauthorized | ErrorKind::SessionExpired | ErrorKind::RefreshRejected => {
                "Your session has expired, please log in again"
            }
            ErrorKind::Forbidden => "You do not have access to this resource",
            ErrorKind::AlreadyInProgress => "Login already in progress",
            ErrorKind::InvalidInput => "Email and password are required",
            ErrorKind::UnexpectedResponse | ErrorKind::Storage => "Something went wrong",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidCredentials => "InvalidCredentials",
            ErrorKind::InactiveUser => "InactiveUser",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::UnexpectedResponse => "UnexpectedResponse",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::RefreshRejected => "RefreshRejected",
            ErrorKind::SessionExpired => "SessionExpired",
            ErrorKind::AlreadyInProgress => "AlreadyInProgress",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Storage => "Storage",
        };
        f.write_str(name)
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A response the client could not map onto a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    /// HTTP status code, if the failure came from a status line.
    pub status: Option<u16>,
    /// Server-provided detail or a description of the malformed body.
    pub message: Option<String>,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.message.as_deref()) {
            (Some(status), Some(message)) => write!(f, "HTTP {}: {}", status, message),
            (Some(status), None) => write!(f, "HTTP {}", status),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("malformed response"),
        }
    }
}

impl std::error::Error for ResponseError {}

impl ResponseError {
    /// Create an error for an unexpected status code.
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self {
            status: Some(status),
            message,
        }
    }

    /// Create an error for a body that is missing required fields.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Credentials failed the presence check.
    #[error("{reason}")]
    Credentials { reason: String },
}
