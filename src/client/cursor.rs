//! Pagination cursors carried by GitHub's `Link` response header

use compact_str::CompactString;

const NEXT_REL: &str = "rel=\"next\"";

/// Opaque pointer to the next page of results: the full next-page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(CompactString);

impl PageCursor {
    pub fn new(url: impl Into<CompactString>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the `rel="next"` URL from a `Link` header value.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/gists/public?page=2>; rel="next", <...?page=100>; rel="last"`
///
/// The matching segment has its angle brackets, separators, the `rel="next"`
/// parameter and all spaces removed; whatever remains is the cursor.
pub fn parse_next_page(link_header: Option<&str>) -> Option<PageCursor> {
    let header = link_header?;

    header
        .split(',')
        .find(|segment| segment.contains(NEXT_REL))
        .map(|segment| {
            let url: String = segment
                .replace(NEXT_REL, "")
                .chars()
                .filter(|c| !matches!(c, '<' | '>' | ';' | ' '))
                .collect();
            PageCursor::new(url)
        })
        .filter(|cursor| !cursor.0.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header_means_no_cursor() {
        assert_eq!(parse_next_page(None), None);
    }

    #[test]
    fn test_next_and_last() {
        let header = "<https://api.example.com/gists?page=2>; rel=\"next\", \
                      <https://api.example.com/gists?page=5>; rel=\"last\"";

        let cursor = parse_next_page(Some(header)).unwrap();
        assert_eq!(cursor.as_str(), "https://api.example.com/gists?page=2");
    }

    #[test]
    fn test_next_is_not_first_segment() {
        let header = "<https://api.github.com/gists/public?page=1>; rel=\"prev\", \
                      <https://api.github.com/gists/public?page=3>; rel=\"next\"";

        let cursor = parse_next_page(Some(header)).unwrap();
        assert_eq!(cursor.as_str(), "https://api.github.com/gists/public?page=3");
    }

    #[test]
    fn test_last_page_has_no_next() {
        let header = "<https://api.github.com/gists/public?page=1>; rel=\"first\", \
                      <https://api.github.com/gists/public?page=9>; rel=\"prev\"";

        assert_eq!(parse_next_page(Some(header)), None);
    }

    #[test]
    fn test_empty_header() {
        assert_eq!(parse_next_page(Some("")), None);
    }
}
