//! Command implementations for the luminous CLI

pub mod config;
pub mod import;
pub mod migrate;
pub mod serve;

pub use config::run_config;
pub use import::run_import;
pub use migrate::run_migrate;
pub use serve::run_serve;
