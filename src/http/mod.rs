//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, HTTP/1.x and HTTP/2)
//!     → request.rs (request ID, request line)
//!     → middleware/legacy_gate.rs (scope lookup, gate decision)
//!         → rejected: response.rs (426 with Upgrade headers)
//!         → allowed: server.rs forward handler → upstream
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestLine, X_REQUEST_ID};
pub use server::{AppState, HttpServer, Runtime, SharedRuntime};
