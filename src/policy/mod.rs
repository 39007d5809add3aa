//! Blocking policy subsystem.
//!
//! # Data Flow
//! ```text
//! config file
//!     → fragment.rs (one PolicyFragment per scope, tri-state flags)
//!     → resolver.rs (merge global → host → location, apply disable cascade)
//!     → EffectivePolicy (concrete booleans, immutable)
//!     → attached to a routing Scope and shared via Arc
//! ```
//!
//! # Design Decisions
//! - Unset flags are an explicit `Toggle::Inherit`, never a sentinel value
//! - Resolution happens once per configuration generation, never per request
//! - A disabled scope forces every block flag off for itself only; child
//!   scopes inherit the unforced values

pub mod fragment;
pub mod resolver;
pub mod toggle;

use std::path::PathBuf;

use thiserror::Error;

pub use fragment::PolicyFragment;
pub use resolver::{EffectivePolicy, Inherited};
pub use toggle::Toggle;

/// Directive that enables the module for a scope.
pub const DIRECTIVE_ENABLE: &str = "block_legacy_http";
pub const DIRECTIVE_BLOCK_HTTP09: &str = "block_http09";
pub const DIRECTIVE_BLOCK_HTTP10: &str = "block_http10";
pub const DIRECTIVE_BLOCK_HTTP11: &str = "block_http11";
/// Inline custom rejection body.
pub const DIRECTIVE_MESSAGE: &str = "legacy_http_message";
/// Custom rejection body read from a file when the configuration is loaded.
pub const DIRECTIVE_MESSAGE_FILE: &str = "legacy_http_message_file";

/// Errors raised while authoring a policy fragment.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("\"legacy_http_message\" is duplicate")]
    DuplicateCustomMessage,

    #[error("unknown directive \"{name}\"")]
    UnknownDirective { name: String },

    #[error("invalid value \"{value}\", it must be \"on\", \"off\" or \"inherit\"")]
    InvalidFlag { value: String },

    #[error("failed to read message file {}: {source}", .path.display())]
    MessageFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
