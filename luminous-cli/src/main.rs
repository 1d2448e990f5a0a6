//! luminous CLI - Luminous Verses API server and maintenance commands
//!
//! - `serve`: run the HTTP API
//! - `migrate`: create missing Postgres tables
//! - `import-descriptions`: upsert surah descriptions from JSON
//! - `config`: print the effective configuration, secrets redacted

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "luminous",
    author,
    version,
    about = "Quran and Bible reference API for the Luminous Verses apps"
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the Postgres tables if they do not exist
    Migrate,
    /// Upsert surah descriptions from a JSON file
    ImportDescriptions(commands::import::ImportArgs),
    /// Show the effective configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate => commands::run_migrate().await?,
        Commands::ImportDescriptions(args) => commands::run_import(args).await?,
        Commands::Config(args) => commands::run_config(args)?,
    }

    Ok(())
}
