//! Configuration management for the Gists client

use std::{path::PathBuf, time::Duration};

use compact_str::CompactString;

use super::error::{ClientError, Result};
use crate::config::GistrConfig;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OAUTH_URL: &str = "https://github.com";
pub const DEFAULT_SCOPE: &str = "gist";
pub const DEFAULT_STATE: &str = "TEST_STATE";

/// Main configuration for the Gists client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL
    pub api_url: CompactString,
    /// Base URL hosting the OAuth authorize and token endpoints
    pub oauth_url: CompactString,
    /// OAuth application settings
    pub oauth: OAuthConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Debug configuration
    pub debug: DebugConfig,
}

/// OAuth application credentials and authorize parameters
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: CompactString,
    pub client_secret: CompactString,
    /// Requested scope
    pub scope: CompactString,
    /// Anti-forgery state sent with the authorize request
    pub state: CompactString,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header, required by GitHub
    pub user_agent: CompactString,
}

/// Debug and logging configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Enable debug logging of HTTP responses
    pub log_responses: bool,
    /// Directory for storing debug logs
    pub log_directory: Option<PathBuf>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("state", &self.state)
            .finish()
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("gistr/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_responses: false,
            log_directory: Some(PathBuf::from("gistr-logs")),
        }
    }
}

impl OAuthConfig {
    pub fn new(client_id: impl Into<CompactString>, client_secret: impl Into<CompactString>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.into(),
            state: DEFAULT_STATE.into(),
        }
    }

    /// Signing in needs the OAuth App credentials; browsing public gists does not
    pub fn ensure_credentials(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(ClientError::config_validation("client_id", "required to sign in"));
        }

        if self.client_secret.is_empty() {
            return Err(ClientError::config_validation("client_secret", "required to sign in"));
        }

        Ok(())
    }
}

impl ClientConfig {
    /// Create a new client configuration against the public GitHub endpoints
    pub fn new(
        client_id: impl Into<CompactString>,
        client_secret: impl Into<CompactString>,
    ) -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            oauth_url: DEFAULT_OAUTH_URL.into(),
            oauth: OAuthConfig::new(client_id, client_secret),
            request: RequestConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_base_url("api_url", &self.api_url)?;
        validate_base_url("oauth_url", &self.oauth_url)?;

        if self.oauth.scope.is_empty() {
            return Err(ClientError::config_validation("scope", "cannot be empty"));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config("Timeout must be greater than zero"));
        }

        if self.request.user_agent.is_empty() {
            return Err(ClientError::config_validation("user_agent", "GitHub requires a User-Agent"));
        }

        Ok(())
    }

    /// Point both API and OAuth endpoints elsewhere, e.g. a mock server
    pub fn with_base_urls(
        mut self,
        api_url: impl Into<CompactString>,
        oauth_url: impl Into<CompactString>,
    ) -> Self {
        self.api_url = trim_trailing_slash(api_url.into());
        self.oauth_url = trim_trailing_slash(oauth_url.into());
        self
    }

    /// Enable debug logging
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug.log_responses = enabled;
        self
    }
}

impl From<GistrConfig> for ClientConfig {
    fn from(config: GistrConfig) -> Self {
        let api_url = config.api_url.unwrap_or_else(|| DEFAULT_API_URL.into());
        let oauth_url = config.oauth_url.unwrap_or_else(|| DEFAULT_OAUTH_URL.into());

        Self::new(config.client_id, config.client_secret).with_base_urls(api_url, oauth_url)
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(ClientError::config_validation(field, "cannot be empty"));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::config_validation(field, "must start with http:// or https://"));
    }

    Ok(())
}

fn trim_trailing_slash(url: CompactString) -> CompactString {
    match url.strip_suffix('/') {
        Some(trimmed) => trimmed.into(),
        None => url,
    }
}
