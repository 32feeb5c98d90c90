//! Turns raw responses into domain values or classified errors

use compact_str::CompactString;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::{
    api::Transport,
    cursor::{parse_next_page, PageCursor},
    error::{ClientError, Result},
    oauth::OAuthToken,
};
use crate::domain::{Gist, GistDto};

/// Decode a page of gists along with the cursor for the following page.
///
/// Elements that do not decode into a [`Gist`] are dropped, so the page may
/// be shorter than the array the server sent.
pub fn decode_gist_page(transport: Transport) -> Result<(Vec<Gist>, Option<PageCursor>)> {
    let response = transport?;

    let elements = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Array(elements)) => elements,
        _ => return Err(classify_non_array(&response.body)),
    };

    let raw_count = elements.len();
    let gists: Vec<Gist> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_value::<GistDto>(element) {
            Ok(dto) => Some(Gist::from(dto)),
            Err(e) => {
                warn!(index, error = %e, "Dropping gist that failed to decode");
                None
            },
        })
        .collect();

    let next = parse_next_page(response.link.as_deref());
    debug!(
        gist_count = gists.len(),
        dropped = raw_count - gists.len(),
        has_next_page = next.is_some(),
        "Decoded gist page"
    );

    Ok((gists, next))
}

/// Decode the token endpoint's `access_token=...&scope=...&token_type=...` body.
pub fn decode_token_exchange(transport: Transport) -> Result<OAuthToken> {
    let response = transport?;

    form_urlencoded::parse(response.body.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .map(|value| OAuthToken::new(value.into_owned()))
        .ok_or_else(|| ClientError::auth_could_not(response.body.as_str()))
}

/// Pass the body through untouched, unless it is GitHub's error envelope.
pub fn decode_text(transport: Transport) -> Result<String> {
    let response = transport?;

    match error_envelope(&response.body) {
        Some(message) => Err(ClientError::api_provider(message)),
        None => Ok(response.body),
    }
}

fn classify_non_array(body: &str) -> ClientError {
    match error_envelope(body) {
        Some(message) => ClientError::api_provider(message),
        None => ClientError::serialization("expected array"),
    }
}

/// GitHub's `{"message": "..."}` envelope, which any endpoint may return
/// in place of the expected payload
fn error_envelope(body: &str) -> Option<CompactString> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    value
        .as_object()?
        .get("message")?
        .as_str()
        .map(CompactString::from)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::{client::api::RawResponse, client::tests::sample_gist_json, id::GistId};

    fn ok(body: impl Into<String>) -> Transport {
        Ok(RawResponse::new(StatusCode::OK, body))
    }

    #[test]
    fn test_decode_page_with_cursor() {
        let body = json!([sample_gist_json("a"), sample_gist_json("b")]).to_string();
        let link = "<https://api.github.com/gists/public?page=2>; rel=\"next\", \
                    <https://api.github.com/gists/public?page=34>; rel=\"last\"";
        let transport = Ok(RawResponse {
            link: Some(link.to_string()),
            ..RawResponse::new(StatusCode::OK, body)
        });

        let (gists, next) = decode_gist_page(transport).unwrap();
        assert_eq!(gists.len(), 2);
        assert_eq!(gists[0].id, GistId::new("a"));
        assert_eq!(next, Some(PageCursor::new("https://api.github.com/gists/public?page=2")));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let body = json!([sample_gist_json("a"), sample_gist_json("b")]).to_string();

        let (first, _) = decode_gist_page(ok(body.clone())).unwrap();
        let (second, _) = decode_gist_page(ok(body)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_element_is_dropped() {
        let body = json!([
            sample_gist_json("a"),
            { "description": "no id, no timestamps" },
            sample_gist_json("c"),
        ])
        .to_string();

        let (gists, next) = decode_gist_page(ok(body)).unwrap();
        assert_eq!(gists.len(), 2);
        assert_eq!(gists[1].id, GistId::new("c"));
        assert_eq!(next, None);
    }

    #[test]
    fn test_one_bad_among_three_good() {
        let body = json!([sample_gist_json("a"), sample_gist_json("b"), 42, sample_gist_json("d")])
            .to_string();

        let (gists, _) = decode_gist_page(ok(body)).unwrap();
        assert_eq!(gists.len(), 3);
    }

    #[test]
    fn test_error_envelope() {
        let result = decode_gist_page(ok(r#"{"message": "Bad credentials"}"#));
        assert!(matches!(
            result,
            Err(ClientError::ApiProvider { ref reason }) if reason == "Bad credentials"
        ));
    }

    #[test]
    fn test_object_without_message() {
        let result = decode_gist_page(ok(r#"{"documentation_url": "https://docs.github.com"}"#));
        assert!(matches!(
            result,
            Err(ClientError::Serialization { ref reason }) if reason == "expected array"
        ));
    }

    #[test]
    fn test_non_json_body() {
        let result = decode_gist_page(ok("<html>Service Unavailable</html>"));
        assert!(matches!(result, Err(ClientError::Serialization { .. })));
    }

    #[test]
    fn test_non_string_message_is_serialization() {
        let result = decode_gist_page(ok(r#"{"message": 42}"#));
        assert!(matches!(result, Err(ClientError::Serialization { .. })));
    }

    #[test]
    fn test_token_exchange() {
        let token = decode_token_exchange(ok("access_token=abc123&scope=gist&token_type=bearer"))
            .unwrap();
        assert_eq!(token.secret(), "abc123");
    }

    #[test]
    fn test_token_exchange_param_order() {
        let token = decode_token_exchange(ok("scope=gist&token_type=bearer&access_token=e72e16c7"))
            .unwrap();
        assert_eq!(token.secret(), "e72e16c7");
    }

    #[test]
    fn test_token_exchange_error_body() {
        let body = "error=bad_verification_code&error_description=The+code+passed+is+incorrect";
        let result = decode_token_exchange(ok(body));
        assert!(matches!(
            result,
            Err(ClientError::AuthCouldNot { ref reason }) if reason == body
        ));
    }

    #[test]
    fn test_token_exchange_empty_token() {
        let result = decode_token_exchange(ok("access_token=&scope=gist"));
        assert!(matches!(result, Err(ClientError::AuthCouldNot { .. })));
    }

    #[test]
    fn test_decode_text() {
        let body = json!([sample_gist_json("a")]).to_string();
        assert_eq!(decode_text(ok(body.clone())).unwrap(), body);

        let result = decode_text(ok(r#"{"message": "Requires authentication"}"#));
        assert!(matches!(result, Err(ClientError::ApiProvider { .. })));
    }
}
