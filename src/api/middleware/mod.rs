//! API Middleware
//!
//! Contains middleware for:
//! - Access logging with request correlation and failure containment

pub mod access_log;

pub use access_log::access_log_middleware;
