//! HTTP server layer
//!
//! Axum server with:
//! - CORS (permissive by default) and a uniform OPTIONS short-circuit
//! - Request tracing
//! - Graceful shutdown
//! - JSON error envelope

pub mod error;
pub mod extractors;
pub mod preflight;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig, ServerError};
