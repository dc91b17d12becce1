//! Error types for the SubSphere client
//!
//! Provides:
//! - A single error enum for every call made through the HTTP layer
//! - Classification into the failure taxonomy the views care about
//! - A user-safe message that never leaks raw transport text

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Shown when nothing more specific is known about a failure
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Which client variant produced a response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Bearer token attached, subject to the session controller
    Authenticated,
    /// No token, never triggers the unauthorized redirect
    Public,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Authenticated => "authenticated",
            ClientKind::Public => "public",
        }
    }
}

/// Coarse failure classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was received
    Network,
    /// Bad credentials or unknown account
    Authentication,
    /// Missing role, or an expired/invalid token
    Authorization,
    /// Input rejected by the backend
    Validation,
    /// Duplicate resource
    Conflict,
    /// Resource does not exist
    NotFound,
    /// Success status with an unusable body
    MalformedSuccess,
    /// Any other non-2xx answer
    Upstream,
    /// Local storage, configuration or encoding failure
    Local,
}

/// Client error types
#[derive(Error, Debug)]
pub enum ApiError {
    // Transport
    #[error("Network error: {message}")]
    Network { message: String },

    // Authentication / authorization
    #[error("Request failed with status code 401")]
    Unauthorized {
        client: ClientKind,
        message: Option<String>,
    },

    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },

    // Bodies
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // Local failures
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status carried by the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of the server's error body
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. } | ApiError::Status { message, .. } => {
                message.as_deref().filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }

    /// The `error` field of the server's error body
    pub fn server_error(&self) -> Option<&str> {
        match self {
            ApiError::Status { error, .. } => error.as_deref().filter(|e| !e.is_empty()),
            _ => None,
        }
    }

    /// True for a 401 received by the authenticated client
    pub fn is_session_expiry(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized {
                client: ClientKind::Authenticated,
                ..
            }
        )
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Unauthorized {
                client: ClientKind::Public,
                ..
            } => ErrorKind::Authentication,
            ApiError::Unauthorized { .. } => ErrorKind::Authorization,
            ApiError::Status { status, .. } => match *status {
                400 | 422 => ErrorKind::Validation,
                403 => ErrorKind::Authorization,
                404 => ErrorKind::NotFound,
                409 => ErrorKind::Conflict,
                _ => ErrorKind::Upstream,
            },
            ApiError::Decode { .. } => ErrorKind::MalformedSuccess,
            ApiError::Storage(_) | ApiError::Configuration { .. } | ApiError::Serialization(_) => {
                ErrorKind::Local
            }
        }
    }

    /// Message safe to show to a user
    pub fn user_message(&self) -> String {
        self.server_message()
            .or_else(|| self.server_error())
            .unwrap_or(GENERIC_FAILURE)
            .to_string()
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Configuration {
            message: err.to_string(),
        }
    }
}
