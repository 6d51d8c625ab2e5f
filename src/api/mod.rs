//! # HTTP Surface
//!
//! Error mapping and the router served by the `service-guard` binary.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{build_router, AppState};
