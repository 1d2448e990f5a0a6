//! Schema setup command

use anyhow::{Context, Result};

use luminous_core::Settings;
use luminous_server::db::{schema, LazyPool};

pub async fn run_migrate() -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    let pool = LazyPool::new(settings.postgres);

    schema::run(&pool).await.context("Migration failed")?;
    pool.close().await;

    println!("Schema is up to date");
    Ok(())
}
