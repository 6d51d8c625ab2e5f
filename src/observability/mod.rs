//! # Observability
//!
//! Structured logging for the guard library and binary. HTTP request tracing
//! is layered on by the binary with `tower-http`.

pub mod logging;

pub use logging::{init_logging, log_config_info};
