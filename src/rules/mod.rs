//! Rule engine subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (url, headers, cookies, query)
//!     → engine.rs (load current snapshot)
//!     → evaluator.rs (priority order, skip disabled/foreign rules)
//!     → matcher.rs (path | identify | version | weight)
//!         ↳ identity.rs, version.rs
//!     → Return: Mark or no match
//!
//! Rule Loading:
//!     inline config rules ──┐
//!     store records → parser.rs ──→ store.rs (sorted snapshot, atomic swap)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a reload swaps the whole list
//! - First match wins (ordered by priority)
//! - Matching never fails: a missing input is a non-match

pub mod engine;
pub mod evaluator;
pub mod identity;
pub mod matcher;
pub mod parser;
pub mod store;
pub mod types;
pub mod version;

pub use engine::{MarkEngine, MarkSettings};
pub use identity::{LookupFields, RequestContext};
pub use parser::{parse_rule, ParseError};
pub use store::{RuleSnapshot, RuleStore};
pub use types::{Mark, Rule, RuleType};
