//! Shared Error Types
//!
//! Error types used by the request client, the session store and the token
//! storage. They are kept together so the desktop shell and the tests can
//! match on them without reaching into the modules that produce them.
//!
//! # Error Categories
//!
//! - `ApiError` - failures of a single REST call
//! - `AuthError` - failures of a login attempt
//! - `StorageError` - failures reading or writing the persisted token
//!
//! # Usage
//!
//! ```rust
//! use reqwest::StatusCode;
//! use studio_admin::shared::error::ApiError;
//!
//! let error = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "capacity must be positive");
//! assert_eq!(error.status(), Some(422));
//! ```
use std::io;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::messages;

/// Failure of a single request made through the guarded client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered 401. The session store reacts to this globally.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Server-provided detail, or the canonical reason
        message: String,
    },

    /// Any other 4xx answer, typically validation of a create/update payload.
    #[error("Request rejected ({status}): {message}")]
    BadRequest {
        /// HTTP status code
        status: u16,
        /// Server-provided detail, or the canonical reason
        message: String,
    },

    /// 5xx, or a non-success status outside the 4xx range.
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Server-provided detail, or the canonical reason
        message: String,
    },

    /// No response was received (connect failure, timeout, TLS).
    #[error("Network error: {message}")]
    Network {
        /// Transport error description
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Decoder error description
        message: String,
    },

    /// The request could not be built (bad path, unserializable body).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Builder error description
        message: String,
    },
}

impl ApiError {
    /// Classify a non-success status.
    ///
    /// 401 is `Unauthorized`, the rest of 4xx is `BadRequest`, everything
    /// else is `ServerError`.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status.as_u16() {
            401 => Self::Unauthorized { message },
            code @ 400..=499 => Self::BadRequest { status: code, message },
            code => Self::ServerError { status: code, message },
        }
    }

    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::BadRequest { status, .. } | Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else if err.is_builder() {
            Self::invalid_request(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status, err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(format!("JSON error: {}", err))
    }
}

/// Failure of a login attempt.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Identifier or secret was empty after trimming.
    #[error("Login and password are required")]
    MissingCredentials,

    /// The server rejected the credentials (400).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Any other failure of the login call.
    #[error("Login failed: {0}")]
    TransientFailure(#[source] ApiError),

    /// The session store was torn down while the login was in flight.
    #[error("Session closed before login completed")]
    Cancelled,
}

impl AuthError {
    /// Classify a failed login call.
    pub fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::BadRequest { status: 400, .. } => Self::InvalidCredentials,
            other => Self::TransientFailure(other),
        }
    }

    /// Message shown to the operator for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => messages::MISSING_CREDENTIALS,
            Self::InvalidCredentials => messages::INVALID_CREDENTIALS,
            Self::TransientFailure(
                ApiError::InvalidResponse { .. } | ApiError::InvalidRequest { .. },
            ) => messages::UNEXPECTED,
            Self::TransientFailure(_) | Self::Cancelled => messages::LOGIN_FAILED,
        }
    }
}

/// Failure of the persisted token storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Token storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No storage location could be determined for this platform.
    #[error("No token storage location available")]
    NoLocation,
}

impl StorageError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
