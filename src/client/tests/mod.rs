//! Test utilities and common test fixtures for client modules

use serde_json::json;

use crate::client::config::ClientConfig;


/// JSON representation of a gist as returned by `GET /gists/public`
pub fn sample_gist_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "url": format!("https://api.github.com/gists/{id}"),
        "html_url": format!("https://gist.github.com/{id}"),
        "description": "Hello World Examples",
        "public": true,
        "comments": 0,
        "owner": {
            "login": "octocat",
            "id": 1
        },
        "files": {
            "hello_world.rb": {
                "filename": "hello_world.rb",
                "type": "application/x-ruby",
                "language": "Ruby",
                "raw_url": format!("https://gist.githubusercontent.com/octocat/{id}/raw/hello_world.rb"),
                "size": 167
            }
        },
        "created_at": "2010-04-14T02:15:15Z",
        "updated_at": "2011-06-20T11:34:15Z"
    })
}

/// A page of gists with the given ids
pub fn gist_page_json(ids: &[&str]) -> serde_json::Value {
    serde_json::Value::Array(ids.iter().map(|id| sample_gist_json(id)).collect())
}

/// GitHub API error envelope
pub fn github_error_response(message: &str) -> serde_json::Value {
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
}

/// `Link` header pointing at the next and last page on the mock server
pub fn link_header(base_url: &str, next: u32, last: u32) -> String {
    format!(
        "<{base_url}/gists/public?page={next}>; rel=\"next\", \
         <{base_url}/gists/public?page={last}>; rel=\"last\""
    )
}

/// Mock HTTP server standing in for both api.github.com and github.com
pub struct MockServer {
    pub server: wiremock::MockServer,
}

impl MockServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = wiremock::MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Create a test config pointing to this mock server
    pub fn test_config(&self) -> ClientConfig {
        ClientConfig::new("test-client", "test-secret")
            .with_base_urls(self.base_url(), self.base_url())
    }
}

#[allow(clippy::module_inception)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_creation() {
        let gist = sample_gist_json("aa5a315d61ae9438b18d");
        assert_eq!(gist["id"], "aa5a315d61ae9438b18d");
        assert_eq!(gist["owner"]["login"], "octocat");

        let page = gist_page_json(&["a", "b", "c"]);
        assert_eq!(page.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_link_header() {
        let header = link_header("http://127.0.0.1:1234", 2, 5);
        assert!(header.starts_with("<http://127.0.0.1:1234/gists/public?page=2>; rel=\"next\""));
        assert!(header.ends_with("rel=\"last\""));
    }
}
