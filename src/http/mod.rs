//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → middleware/mark.rs (evaluate rules, set mark header)
//!     → server.rs forward handler (next stage: upstream)
//!     → Send upstream response to client
//! ```

pub mod middleware;
pub mod server;

pub use server::HttpServer;
