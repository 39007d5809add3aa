//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn a gate rejection into the wire response
//! - Strip hop-by-hop headers from upstream responses
//!
//! # Design Decisions
//! - Rejections always carry an explicit Content-Length
//! - Upstream bodies are streamed, never buffered

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::gate::Rejection;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let content_length = HeaderValue::from(self.content_length());
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        headers.insert(header::CONTENT_LENGTH, content_length);
        response
    }
}

/// Remove headers that only apply to a single connection.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ] {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{decide, ProtocolVersion, RequestFacts, Verdict};
    use crate::policy::{resolver::resolve, PolicyFragment, Toggle};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_rejection_response() {
        let policy = resolve([&PolicyFragment {
            enabled: Toggle::On,
            ..Default::default()
        }]);
        let facts = RequestFacts {
            version: ProtocolVersion::Http10,
            client: &"127.0.0.1",
            request_line: &"GET / HTTP/1.0",
        };
        let Verdict::Reject(rejection) = decide(&policy, &facts).unwrap() else {
            panic!("expected rejection");
        };
        let expected_len = rejection.body.len();

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
        assert_eq!(response.headers()[header::UPGRADE], "HTTP/2.0, HTTP/1.1");
        assert_eq!(response.headers()[header::CONNECTION], "Upgrade");
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            expected_len.to_string().as_str()
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), expected_len);
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }
}
