//! Configuration inspection

use anyhow::{Context, Result};
use clap::Parser;

use luminous_core::Settings;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print the config file path and exit
    #[arg(long)]
    pub path: bool,

    /// Print as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Settings::config_path().display());
        return Ok(());
    }

    let settings = Settings::load()
        .context("Failed to load configuration")?
        .redacted();

    let rendered = if args.json {
        serde_json::to_string_pretty(&settings)?
    } else {
        toml::to_string_pretty(&settings).context("Failed to render configuration")?
    };
    println!("{}", rendered);
    Ok(())
}
