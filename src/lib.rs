//! Legacy HTTP protocol gate.
//!
//! Rejects requests made over HTTP/0.9, HTTP/1.0 or HTTP/1.1 with
//! `426 Upgrade Required`, according to a policy that can be set globally,
//! per virtual host and per path.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod policy;
pub mod routing;

pub use config::schema::GateConfig;
pub use gate::{decide, RequestFacts, Verdict};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use policy::{EffectivePolicy, PolicyFragment};
