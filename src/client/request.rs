//! Outbound request construction for every Gists API operation
//!
//! Building a request has no side effects and performs no authorization
//! checks; a missing token simply yields a request without credentials.

use compact_str::{format_compact, CompactString};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Method,
};
use url::{form_urlencoded, Url};

use super::{
    config::ClientConfig,
    cursor::PageCursor,
    error::{ClientError, Result},
    oauth::OAuthToken,
};

const GITHUB_JSON: &str = "application/vnd.github+json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Operation descriptor
#[derive(Debug, Clone)]
pub enum GistRequest {
    /// A page of public gists; `None` requests the first page
    PublicGists { cursor: Option<PageCursor> },
    /// The authenticated user's gists
    UserGists { token: Option<OAuthToken> },
    /// Trade an authorization code for an access token
    ExchangeOAuthCode {
        client_id: CompactString,
        client_secret: CompactString,
        code: CompactString,
    },
    /// The page the user visits to grant access
    AuthorizeUrl {
        client_id: CompactString,
        scope: CompactString,
        state: CompactString,
    },
}

/// A fully-formed request, ready for the transport
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Maps operation descriptors onto GitHub endpoints
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_url: CompactString,
    oauth_url: CompactString,
    user_agent: HeaderValue,
}

impl Endpoints {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&config.request.user_agent)
            .map_err(|_| ClientError::config_validation("user_agent", "not a valid header value"))?;

        Ok(Self {
            api_url: config.api_url.clone(),
            oauth_url: config.oauth_url.clone(),
            user_agent,
        })
    }

    pub fn build(&self, request: &GistRequest) -> Result<ApiRequest> {
        match request {
            GistRequest::PublicGists { cursor } => {
                let url = match cursor {
                    Some(cursor) => parse_url(cursor.as_str())?,
                    None => parse_url(&format_compact!("{}/gists/public", self.api_url))?,
                };
                Ok(self.api_get(url))
            },
            GistRequest::UserGists { token } => {
                let url = parse_url(&format_compact!("{}/gists", self.api_url))?;
                let mut request = self.api_get(url);
                if let Some(token) = token {
                    let value = HeaderValue::from_str(&format_compact!("token {}", token.secret()))
                        .map_err(|_| ClientError::auth_could_not("token is not a valid header value"))?;
                    request.headers.insert(AUTHORIZATION, value);
                }
                Ok(request)
            },
            GistRequest::ExchangeOAuthCode { client_id, client_secret, code } => {
                let url =
                    parse_url(&format_compact!("{}/login/oauth/access_token", self.oauth_url))?;
                let body = form_urlencoded::Serializer::new(String::new())
                    .append_pair("client_id", client_id)
                    .append_pair("client_secret", client_secret)
                    .append_pair("code", code)
                    .finish();

                let mut headers = self.base_headers();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
                headers.insert(ACCEPT, HeaderValue::from_static(FORM_URLENCODED));

                Ok(ApiRequest { method: Method::POST, url, headers, body: Some(body) })
            },
            GistRequest::AuthorizeUrl { client_id, scope, state } => {
                let mut url =
                    parse_url(&format_compact!("{}/login/oauth/authorize", self.oauth_url))?;
                url.query_pairs_mut()
                    .append_pair("client_id", client_id)
                    .append_pair("scope", scope)
                    .append_pair("state", state);

                Ok(ApiRequest { method: Method::GET, url, headers: HeaderMap::new(), body: None })
            },
        }
    }

    fn api_get(&self, url: Url) -> ApiRequest {
        let mut headers = self.base_headers();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        ApiRequest { method: Method::GET, url, headers, body: None }
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|_| ClientError::invalid_url(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        let config = ClientConfig::new("client", "secret")
            .with_base_urls("https://api.example.com", "https://example.com");
        Endpoints::new(&config).unwrap()
    }

    #[test]
    fn test_first_public_page() {
        let request = endpoints()
            .build(&GistRequest::PublicGists { cursor: None })
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "https://api.example.com/gists/public");
        assert_eq!(request.headers[ACCEPT], GITHUB_JSON);
        assert!(request.headers.contains_key(USER_AGENT));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_cursor_is_used_verbatim() {
        let cursor = PageCursor::new("https://api.example.com/gists/public?page=3");
        let request = endpoints()
            .build(&GistRequest::PublicGists { cursor: Some(cursor) })
            .unwrap();

        assert_eq!(request.url.as_str(), "https://api.example.com/gists/public?page=3");
    }

    #[test]
    fn test_garbage_cursor() {
        let cursor = PageCursor::new("not a url");
        let result = endpoints().build(&GistRequest::PublicGists { cursor: Some(cursor) });
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }

    #[test]
    fn test_user_gists_with_token() {
        let request = endpoints()
            .build(&GistRequest::UserGists { token: Some(OAuthToken::new("abc123")) })
            .unwrap();

        assert_eq!(request.url.as_str(), "https://api.example.com/gists");
        assert_eq!(request.headers[AUTHORIZATION], "token abc123");
    }

    #[test]
    fn test_user_gists_without_token_still_builds() {
        let request = endpoints()
            .build(&GistRequest::UserGists { token: None })
            .unwrap();

        assert!(!request.headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_exchange_code() {
        let request = endpoints()
            .build(&GistRequest::ExchangeOAuthCode {
                client_id: "client".into(),
                client_secret: "s3cr&t".into(),
                code: "xyz".into(),
            })
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "https://example.com/login/oauth/access_token");
        assert_eq!(request.headers[CONTENT_TYPE], FORM_URLENCODED);
        assert_eq!(
            request.body.as_deref(),
            Some("client_id=client&client_secret=s3cr%26t&code=xyz")
        );
    }

    #[test]
    fn test_authorize_url() {
        let request = endpoints()
            .build(&GistRequest::AuthorizeUrl {
                client_id: "client".into(),
                scope: "gist".into(),
                state: "TEST_STATE".into(),
            })
            .unwrap();

        assert_eq!(
            request.url.as_str(),
            "https://example.com/login/oauth/authorize?client_id=client&scope=gist&state=TEST_STATE"
        );
    }
}
