//! Allow/reject classification for one request.

use std::fmt;

use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};

use crate::gate::body::render_default;
use crate::gate::log::BlockedRequest;
use crate::gate::version::ProtocolVersion;
use crate::gate::GateError;
use crate::policy::EffectivePolicy;

/// Value of the `Upgrade` header on every rejection.
pub const UPGRADE_OFFER: &str = "HTTP/2.0, HTTP/1.1";
/// Value of the `Connection` header on every rejection.
pub const CONNECTION_UPGRADE: &str = "Upgrade";

/// What the host knows about a request once its scope is selected.
///
/// Client and request line are only formatted when the request is rejected.
#[derive(Clone, Copy)]
pub struct RequestFacts<'a> {
    pub version: ProtocolVersion,
    pub client: &'a dyn fmt::Display,
    pub request_line: &'a dyn fmt::Display,
}

impl fmt::Debug for RequestFacts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFacts")
            .field("version", &self.version)
            .field("client", &format_args!("{}", self.client))
            .field("request_line", &format_args!("{}", self.request_line))
            .finish()
    }
}

/// Outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Reject(Rejection),
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// A complete 426 response plus the record describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub headers: [(HeaderName, HeaderValue); 2],
    pub body: Bytes,
    pub log: BlockedRequest,
}

impl Rejection {
    /// Byte length advertised as `Content-Length`.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// Decide whether a request may proceed under `policy`.
///
/// Versions outside HTTP/0.9, 1.0 and 1.1 are always allowed.
pub fn decide(policy: &EffectivePolicy, facts: &RequestFacts<'_>) -> Result<Verdict, GateError> {
    if !policy.enabled() {
        return Ok(Verdict::Allow);
    }

    let blocked = match facts.version {
        ProtocolVersion::Http09 => policy.block_http09(),
        ProtocolVersion::Http10 => policy.block_http10(),
        ProtocolVersion::Http11 => policy.block_http11(),
        ProtocolVersion::Modern => return Ok(Verdict::Allow),
    };
    if !blocked {
        return Ok(Verdict::Allow);
    }
    let version = facts.version.as_str();

    let body = match policy.custom_message() {
        Some(message) => message.clone(),
        None => render_default(version)?,
    };

    Ok(Verdict::Reject(Rejection {
        status: StatusCode::UPGRADE_REQUIRED,
        headers: [
            (header::UPGRADE, HeaderValue::from_static(UPGRADE_OFFER)),
            (header::CONNECTION, HeaderValue::from_static(CONNECTION_UPGRADE)),
        ],
        body,
        log: BlockedRequest::new(version, facts.client, facts.request_line),
    }))
}
