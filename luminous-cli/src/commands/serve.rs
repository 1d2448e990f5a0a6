//! HTTP server command
//!
//! Backends that are not configured are reported at startup and answer
//! 500 per request; the server still starts.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use luminous_core::Settings;
use luminous_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[arg(long, short = 'b', env = "LUMINOUS_BIND")]
    pub bind: Option<SocketAddr>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut settings = Settings::load().context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        settings.server.bind_addr = bind;
    }

    tracing::info!(
        bind = %settings.server.bind_addr,
        cors_permissive = settings.server.cors_permissive,
        "Starting luminous server"
    );

    let state = AppState::from_settings(&settings);
    let config = ServerConfig::from(&settings.server);

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
