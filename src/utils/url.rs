//! URL utilities for consistent URL handling across sources, the converter,
//! and the validator.

use ::url::Url;

/// URL utilities for consistent URL handling.
pub struct UrlUtils;

impl UrlUtils {
    /// Lowercase and strip surrounding whitespace, as the playlist parser
    /// requires (spec §4.2: "URLs are trimmed and lowercased").
    pub fn normalize(url: &str) -> String {
        url.trim().to_ascii_lowercase()
    }

    /// Parse and validate a URL.
    pub fn parse_and_validate(url: &str) -> Result<Url, ::url::ParseError> {
        Url::parse(url)
    }

    /// Extract the host from a URL, if any (used by the IP/CIDR filter
    /// rules, spec §4.3).
    pub fn extract_host(url: &str) -> Option<String> {
        Url::parse(url).ok().and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    /// Rewrite a `https://` URL to `http://`; returns `None` if the URL does
    /// not use the https scheme.
    pub fn https_to_http(url: &str) -> Option<String> {
        url.strip_prefix("https://").map(|rest| format!("http://{rest}"))
    }

    pub fn is_valid(url: &str) -> bool {
        Self::parse_and_validate(url).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(UrlUtils::normalize("  HTTP://Example.COM/Foo "), "http://example.com/foo");
    }

    #[test]
    fn https_to_http_rewrites_scheme_only() {
        assert_eq!(UrlUtils::https_to_http("https://a/b"), Some("http://a/b".to_string()));
        assert_eq!(UrlUtils::https_to_http("http://a/b"), None);
    }

    #[test]
    fn extract_host_parses_domain() {
        assert_eq!(UrlUtils::extract_host("http://stream.example.com:8080/x"), Some("stream.example.com".to_string()));
        assert_eq!(UrlUtils::extract_host("not a url"), None);
    }
}
