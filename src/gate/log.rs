//! Security log record for blocked requests.

use std::fmt;

/// Tracing target blocked-request warnings are written under.
pub const BLOCKED_TARGET: &str = "legacy_gate::blocked";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedRequest {
    pub version: &'static str,
    pub client: String,
    pub request: String,
}

impl BlockedRequest {
    pub fn new(version: &'static str, client: &dyn fmt::Display, request: &dyn fmt::Display) -> Self {
        Self {
            version,
            client: client.to_string(),
            request: request.to_string(),
        }
    }

    /// Write the record at WARN. Never fails; delivery is up to the subscriber.
    pub fn emit(&self) {
        tracing::warn!(
            target: BLOCKED_TARGET,
            version = self.version,
            client = %self.client,
            request = %self.request,
            "{}",
            self
        );
    }
}

impl fmt::Display for BlockedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} request blocked by security policy, client: {}, request: \"{}\"",
            self.version, self.client, self.request
        )
    }
}
