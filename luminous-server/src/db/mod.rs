//! Database layer - lazily opened pool and repositories
//!
//! # Design Principles
//!
//! - Pool capped at one connection by default, opened on first use
//! - Exactly one statement per request
//! - Upserts via ON CONFLICT, no check-then-insert

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{LazyPool, Lease, PgLease, PoolSnapshot, PoolStats};
pub use repos::*;
