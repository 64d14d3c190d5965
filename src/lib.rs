//! Request marking service library.
//!
//! Tags inbound HTTP requests with a routing mark chosen by a prioritized,
//! hot-reloadable rule list, then forwards them to the next stage.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod refresh;
pub mod rules;

pub use config::MarkConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rules::{Mark, MarkEngine, Rule, RuleType};
