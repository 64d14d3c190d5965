//! Rule refresh subsystem.
//!
//! # Data Flow
//! ```text
//! ticker (load_interval_secs)
//!     → source.rs (LRANGE rules_key 0 rule_max_len)
//!     → source.rs (HGETALL <key>, per key)
//!     → rules::parser (skip malformed records)
//!     → RuleStore::replace (sorted snapshot)
//! ```

pub mod refresher;
pub mod source;

pub use refresher::{RefreshError, RefreshReport, Refresher};
pub use source::{RedisRuleSource, RuleSource, StoreError};
