//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + --set overrides
//!     → loader.rs (parse, inline message files, apply overrides)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → routing::ScopeRouter (policies resolved per scope)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new ScopeRouter built off to the side
//!     → atomic swap of Arc<Runtime>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - A reload that fails anywhere keeps the previous generation running

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, ConfigSource, Override};
pub use schema::GateConfig;
pub use schema::HostConfig;
pub use schema::ListenerConfig;
pub use schema::LocationConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
