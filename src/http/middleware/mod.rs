//! HTTP middleware.

pub mod mark;

pub use mark::mark_middleware;
