//! Scope matching logic.
//!
//! # Responsibilities
//! - Extract and normalize the request host
//! - Match path prefix (case-sensitive)
//!
//! # Design Decisions
//! - Host matching is case-insensitive and ignores the port
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use axum::http::{header, Request};

/// Lowercase a host and strip any port and trailing dot.
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim();
    let host = if raw.starts_with('[') {
        // IPv6 literal: keep the brackets, drop the port after them.
        match raw.find(']') {
            Some(end) => &raw[..=end],
            None => raw,
        }
    } else {
        raw.split(':').next().unwrap_or(raw)
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Host the request is addressed to: the URI authority (HTTP/2) or the `Host` header.
pub fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.uri().host().or_else(|| {
        req.headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
    })
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Specificity used to order prefixes, longest first.
    pub fn prefix_len(&self) -> usize {
        self.prefix.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Example.COM"), "example.com");
        assert_eq!(normalize_host("example.com:8080"), "example.com");
        assert_eq!(normalize_host("example.com."), "example.com");
        assert_eq!(normalize_host("[::1]:8080"), "[::1]");
    }

    #[test]
    fn test_request_host() {
        let req = Request::builder()
            .header("Host", "example.com:8080")
            .body(Body::default())
            .unwrap();
        assert_eq!(request_host(&req), Some("example.com:8080"));

        let req = Request::builder()
            .uri("http://authority.test/path")
            .header("Host", "header.test")
            .body(Body::default())
            .unwrap();
        assert_eq!(request_host(&req), Some("authority.test"));

        let req = Request::builder().body(Body::default()).unwrap();
        assert_eq!(request_host(&req), None);
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(matcher.matches("/api/v1"));
        assert!(!matcher.matches("/images"));
        assert!(!matcher.matches("/API"));
    }
}
