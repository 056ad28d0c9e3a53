//! Tracing and logging setup shared by the txroutine binaries.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{init, InitError, LogFormat, LoggingConfig};
