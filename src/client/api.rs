//! Core HTTP transport for the GitHub API

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use chrono::Local;
use compact_str::CompactString;
use reqwest::{
    header::{HeaderMap, ETAG, IF_NONE_MATCH, LINK},
    Client, Method, StatusCode,
};
use tracing::{debug, instrument, warn};

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
    request::{ApiRequest, Endpoints, GistRequest},
};

/// What came back over the wire, before any interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    /// `Link` header, if present
    pub link: Option<String>,
    pub body: String,
}

/// Outcome of executing a request: a response, or a transport-level failure
pub type Transport = std::result::Result<RawResponse, reqwest::Error>;

#[derive(Debug, Clone)]
struct CachedResponse {
    etag: CompactString,
    response: RawResponse,
}

/// HTTP client for the GitHub API with an ETag response cache
#[derive(Debug)]
pub struct GistApi {
    client: Client,
    config: ClientConfig,
    endpoints: Endpoints,
    cache: Mutex<HashMap<String, CachedResponse>>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, link: None, body: body.into() }
    }
}

impl GistApi {
    /// Create a new GitHub API client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request.timeout)
            .build()
            .map_err(ClientError::Network)?;
        let endpoints = Endpoints::new(&config)?;

        Ok(Self {
            client,
            config,
            endpoints,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Build the outbound request for an operation
    pub fn request(&self, operation: &GistRequest) -> Result<ApiRequest> {
        self.endpoints.build(operation)
    }

    /// Send a request and capture the response
    ///
    /// GET responses carrying an `ETag` are remembered; repeating the same
    /// GET sends `If-None-Match` and a `304 Not Modified` is answered from
    /// the cache.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: ApiRequest) -> Transport {
        let ApiRequest { method, url, headers, body } = request;
        let cache_key = (method == Method::GET).then(|| url.to_string());
        // a 304 is answered from this entry, even if the cache is cleared meanwhile
        let cached = cache_key.as_deref().and_then(|key| self.cached(key));

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(hit) = &cached {
            builder = builder.header(IF_NONE_MATCH, hit.etag.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let link = header_string(response.headers(), LINK);
        let etag = header_string(response.headers(), ETAG);
        let url_path = response.url().path().to_string();

        if status == StatusCode::NOT_MODIFIED {
            if let Some(hit) = cached {
                debug!(path = %url_path, "Not modified, serving cached response");
                return Ok(hit.response);
            }
        }

        let body = response.text().await?;
        debug!(status = status.as_u16(), body_length = body.len(), "Received response");

        if self.config.debug.log_responses {
            self.log_response_to_file(&url_path, &body);
        }

        let raw = RawResponse { link, ..RawResponse::new(status, body) };
        if let (Some(key), Some(etag)) = (cache_key, etag) {
            if status.is_success() {
                self.store(key, CachedResponse { etag: etag.into(), response: raw.clone() });
            }
        }

        Ok(raw)
    }

    /// Forget all cached responses
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(entries = cache.len(), "Clearing response cache");
        cache.clear();
    }

    /// Get current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Private helper methods

    fn cached(&self, key: &str) -> Option<CachedResponse> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(key).cloned()
    }

    fn store(&self, key: String, entry: CachedResponse) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(key, entry);
    }

    /// Log HTTP response to file for debugging
    fn log_response_to_file(&self, path: &str, body: &str) {
        if let Some(log_dir) = &self.config.debug.log_directory {
            if !log_dir.exists() {
                if let Err(e) = std::fs::create_dir_all(log_dir) {
                    warn!("Failed to create log directory: {}", e);
                    return;
                }
            }

            let filename = format!(
                "{}_{}.json",
                Local::now().format("%Y-%m-%d_%H-%M-%S%.3f"),
                path.replace('/', "_")
            );

            let log_path = log_dir.join(filename);

            if let Err(e) = std::fs::write(&log_path, body) {
                warn!("Failed to write response log to {:?}: {}", log_path, e);
            } else {
                debug!("Response logged to {:?}", log_path);
            }
        }
    }
}

fn header_string(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ClientConfig {
        ClientConfig::new("client", "secret")
    }

    #[test]
    fn test_api_creation() {
        let api = GistApi::new(test_config());
        assert!(api.is_ok());
    }

    #[test]
    fn test_api_creation_without_credentials() {
        assert!(GistApi::new(ClientConfig::new("", "")).is_ok());
    }

    #[test]
    fn test_api_creation_invalid_config() {
        let config = ClientConfig::new("client", "secret")
            .with_base_urls("ftp://api.example.com", "https://example.com");
        assert!(GistApi::new(config).is_err());
    }

    #[test]
    fn test_request_uses_configured_urls() {
        let config = test_config().with_base_urls("http://localhost:9999", "http://localhost:9998");
        let api = GistApi::new(config).unwrap();

        let request = api.request(&GistRequest::UserGists { token: None }).unwrap();
        assert_eq!(request.url.as_str(), "http://localhost:9999/gists");
    }

    #[test]
    fn test_header_string() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, "W/\"abc\"".parse().unwrap());

        assert_eq!(header_string(&headers, ETAG).as_deref(), Some("W/\"abc\""));
        assert_eq!(header_string(&headers, LINK), None);
    }

    #[test]
    fn test_clear_cache() {
        let api = GistApi::new(test_config()).unwrap();
        api.store(
            "https://api.github.com/gists/public".into(),
            CachedResponse {
                etag: "\"abc\"".into(),
                response: RawResponse::new(StatusCode::OK, "[]"),
            },
        );
        assert!(api.cached("https://api.github.com/gists/public").is_some());

        api.clear_cache();
        assert!(api.cached("https://api.github.com/gists/public").is_none());
    }
}
