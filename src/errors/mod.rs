//! # Error Handling
//!
//! Error types shared by the secret chain, the connection manager and the
//! service binary.

pub mod types;

pub use types::{Error, Result};
