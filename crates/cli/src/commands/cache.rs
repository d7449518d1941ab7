use crate::exit_code::ExitCode;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use query_analyzer_cache::{CacheEntry, SchemaStore};
use query_analyzer_config::DEFAULT_CACHE_DIR;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Show cached schemas
    Info {
        /// Directory for cached schemas
        #[arg(long, value_name = "DIR", default_value = DEFAULT_CACHE_DIR)]
        cache_dir: PathBuf,
    },

    /// Delete every cached schema
    Clear {
        /// Directory for cached schemas
        #[arg(long, value_name = "DIR", default_value = DEFAULT_CACHE_DIR)]
        cache_dir: PathBuf,
    },
}

pub fn run(command: CacheCommands) -> Result<ExitCode> {
    match command {
        CacheCommands::Info { cache_dir } => info(&SchemaStore::new(cache_dir)),
        CacheCommands::Clear { cache_dir } => clear(&SchemaStore::new(cache_dir)),
    }
}

fn info(store: &SchemaStore) -> Result<ExitCode> {
    if !store.root().exists() {
        println!("{}", "Cache directory does not exist.".yellow());
        return Ok(ExitCode::Success);
    }

    let entries = store.info().context("Failed to read the schema cache")?;
    println!();
    println!("{}", "Schema Cache".bold());
    println!("  Location: {}", store.root().display());
    println!("  Cached schemas: {}", entries.len());
    println!();
    for entry in &entries {
        println!("  {}", describe(entry));
    }
    if !entries.is_empty() {
        println!();
    }

    Ok(ExitCode::Success)
}

fn clear(store: &SchemaStore) -> Result<ExitCode> {
    if store.clear().context("Failed to clear the schema cache")? {
        println!("{}", "✓ Cache cleared successfully.".green());
    } else {
        println!("{}", "Cache directory does not exist.".yellow());
    }
    Ok(ExitCode::Success)
}

#[allow(clippy::cast_precision_loss)]
fn describe(entry: &CacheEntry) -> String {
    let size = format!("{:.1} KB", entry.size as f64 / 1024.0);
    match entry.fetched_at {
        Some(at) => format!(
            "{}/{}: {size} (fetched {})",
            entry.api,
            entry.version,
            at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("{}/{}: {size}", entry.api, entry.version),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_entry() {
        let entry = CacheEntry {
            api: "admin".to_string(),
            version: "2025-01".to_string(),
            path: PathBuf::from(".cache/shopify-schema/admin/2025-01.json"),
            size: 2048,
            fetched_at: None,
        };
        assert_eq!(describe(&entry), "admin/2025-01: 2.0 KB");
    }

    #[test]
    fn test_clear_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = SchemaStore::new(dir.path().join("missing"));
        assert_eq!(clear(&store).unwrap(), ExitCode::Success);
        assert_eq!(info(&store).unwrap(), ExitCode::Success);
    }

    #[test]
    fn test_clear_removes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");
        std::fs::create_dir_all(root.join("admin")).unwrap();
        std::fs::write(root.join("admin/2025-01.json"), "{}").unwrap();

        let store = SchemaStore::new(&root);
        assert_eq!(info(&store).unwrap(), ExitCode::Success);
        clear(&store).unwrap();
        assert!(!root.exists());
    }
}
