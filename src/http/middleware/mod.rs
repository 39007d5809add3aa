//! Request middleware.

pub mod legacy_gate;

pub use legacy_gate::{legacy_gate_middleware, MatchedScope};
