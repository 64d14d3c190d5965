//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Marking, refresh and HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated messages, for rule and mark names
//! - Metrics are cheap (no-ops until an exporter is installed)

pub mod logging;
pub mod metrics;
