//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Seed rule store → Spawn refresher → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Stop accepting → Refresher exits → Drain connections → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
