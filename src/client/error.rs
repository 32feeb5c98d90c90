//! Error types for GitHub Gists client operations

use compact_str::CompactString;
use thiserror::Error;

/// Structured error types for Gists client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: DNS, TLS, timeout, connection reset
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// GitHub answered with its own `{"message": ...}` error envelope
    #[error("GitHub API error: {reason}")]
    ApiProvider { reason: CompactString },

    /// The OAuth flow did not yield a usable token
    #[error("Could not authorize: {reason}")]
    AuthCouldNot { reason: CompactString },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {reason}")]
    Serialization { reason: CompactString },

    /// An operation of the same kind is already in flight
    #[error("Another request is already in progress")]
    Busy,

    /// Invalid URL format
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration field validation failed
    #[error("Invalid {field}: {message}")]
    ConfigValidation { field: String, message: String },
}

impl ClientError {
    /// Create an API provider error
    pub fn api_provider(reason: impl Into<CompactString>) -> Self {
        Self::ApiProvider { reason: reason.into() }
    }

    /// Create an authorization error
    pub fn auth_could_not(reason: impl Into<CompactString>) -> Self {
        Self::AuthCouldNot { reason: reason.into() }
    }

    /// Create a serialization error
    pub fn serialization(reason: impl Into<CompactString>) -> Self {
        Self::Serialization { reason: reason.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a configuration field validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Check if this error indicates a temporary network issue
    pub fn is_network_error(&self) -> bool {
        match self {
            ClientError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
