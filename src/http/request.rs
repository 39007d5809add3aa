//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the client sent none
//! - Render the request line for security logs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The request line is formatted lazily, only when a request is blocked

use std::fmt;

use axum::http::{HeaderValue, Method, Request, Uri, Version};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// `METHOD target VERSION`, as the client sent it.
pub struct RequestLine<'a> {
    method: &'a Method,
    uri: &'a Uri,
    version: Version,
}

impl<'a> RequestLine<'a> {
    pub fn of<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            uri: req.uri(),
            version: req.version(),
        }
    }
}

impl fmt::Display for RequestLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `Version`'s Debug output is the wire form, e.g. "HTTP/1.0".
        write!(f, "{} {} {:?}", self.method, self.uri, self.version)
    }
}
