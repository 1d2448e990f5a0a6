//! Outbound clients for third-party backends

pub mod blob;
pub mod edge_config;
pub mod libsql;
pub mod openrouter;

use std::time::Duration;

pub use blob::BlobClient;
pub use edge_config::EdgeConfigClient;
pub use libsql::{LibsqlBibleStore, LibsqlClient, LibsqlMetadata};
pub use openrouter::OpenRouterTranslator;

/// Shared reqwest client with a bounded request time.
pub fn http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("luminous-server/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "Failed to configure reqwest client; using defaults"
            );
            reqwest::Client::new()
        }
    }
}
