//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MarkConfig (validated, immutable)
//!     → inline rules seed the RuleStore
//!     → RedisConfig drives the refresher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the rule list is hot-reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::MarkConfig;
pub use schema::{ListenerConfig, ObservabilityConfig, RedisConfig, TimeoutConfig};
