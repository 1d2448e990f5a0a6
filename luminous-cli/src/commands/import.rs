//! Surah description import
//!
//! Input is a JSON array of `{"surahId": n, "description": "..."}`.
//! The whole file is validated before the database is touched. When a
//! surah appears more than once the last entry wins.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

use luminous_core::{Settings, SurahNumber};
use luminous_server::db::{LazyPool, QuranRepo};

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// JSON file with surah descriptions
    pub file: PathBuf,

    /// Validate only; do not write
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionEntry {
    surah_id: i64,
    description: String,
}

/// Validate entries and collapse duplicates (last wins).
fn parse_entries(json: &str) -> Result<BTreeMap<SurahNumber, String>> {
    let entries: Vec<DescriptionEntry> =
        serde_json::from_str(json).context("Expected a JSON array of {surahId, description}")?;

    let mut out = BTreeMap::new();
    for (i, entry) in entries.into_iter().enumerate() {
        let surah = SurahNumber::new("surahId", entry.surah_id)
            .with_context(|| format!("entry {}", i))?;
        let description = entry.description.trim();
        if description.is_empty() {
            bail!("entry {}: description cannot be empty", i);
        }
        if out.insert(surah, description.to_owned()).is_some() {
            tracing::warn!(%surah, entry = i, "duplicate surah, later entry wins");
        }
    }
    Ok(out)
}

pub async fn run_import(args: ImportArgs) -> Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let entries = parse_entries(&json)?;
    tracing::info!(count = entries.len(), file = %args.file.display(), "descriptions validated");

    if args.dry_run {
        println!("{} descriptions valid (dry run)", entries.len());
        return Ok(());
    }

    let settings = Settings::load().context("Failed to load configuration")?;
    let pool = Arc::new(LazyPool::new(settings.postgres));
    let repo = QuranRepo::new(Arc::clone(&pool));

    for (surah, description) in &entries {
        repo.upsert_description(*surah, description)
            .await
            .with_context(|| format!("Failed to upsert description for surah {}", surah))?;
        tracing::debug!(%surah, "description upserted");
    }
    pool.close().await;

    println!("Imported {} descriptions", entries.len());
    Ok(())
}
