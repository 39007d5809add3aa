//! Request gate subsystem.
//!
//! # Data Flow
//! ```text
//! EffectivePolicy (from the request's scope) + RequestFacts
//!     → decision.rs (enabled? legacy version? flag set?)
//!     → body.rs (custom message or default template)
//!     → log.rs (blocked-request record)
//!     → Verdict::Allow | Verdict::Reject(Rejection)
//! ```
//!
//! # Design Decisions
//! - `decide` is pure; the host emits the log record and the response
//! - The disabled fast path returns before touching the request facts
//! - Protocol versions newer than HTTP/1.1 are never blocked

pub mod body;
pub mod decision;
pub mod log;
pub mod version;

use thiserror::Error;

pub use decision::{decide, Rejection, RequestFacts, Verdict};
pub use log::BlockedRequest;
pub use version::ProtocolVersion;

/// Internal failures while synthesizing a rejection.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("could not allocate {len} bytes for the rejection body")]
    BodyAllocation { len: usize },
}
