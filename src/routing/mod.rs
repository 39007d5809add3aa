//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → router.rs (host lookup, then location lookup)
//!     → matcher.rs (normalize host, match path prefix)
//!     → Return: the Scope (effective policy + upstream)
//!
//! Scope Compilation (at load/reload):
//!     GateConfig
//!     → Merge policy fragments global → host → location
//!     → Sort locations by prefix length
//!     → Freeze as immutable ScopeRouter
//! ```
//!
//! # Design Decisions
//! - Scopes compiled at load time, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same scope

pub mod matcher;
pub mod router;

pub use router::{Scope, ScopeRouter};
