//! luminous-server: HTTP API for Luminous Verses
//!
//! Read-only Quran and Bible lookups over Postgres and LibSQL, metadata
//! from configurable backends, and an authenticated AI translation route.

pub mod auth;
pub mod clients;
pub mod db;
pub mod http;
pub mod state;
pub mod store;
pub mod translate;

pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;
