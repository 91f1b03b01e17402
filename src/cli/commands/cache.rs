//! `proshop cache` command - Manage the report cache
//!
//! The cache is a local SQLite database of record metadata, work-order
//! costs and drill-sheet spans used by `proshop report`. It is gitignored
//! and rebuilt from the record files whenever it is missing or stale.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Shop;
use crate::cli::GlobalOpts;
use crate::core::cache::EntityCache;

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Rebuild the cache from scratch
    Rebuild,

    /// Sync the cache with changed files
    Sync,

    /// Show cache statistics
    Status,

    /// Delete the cache file
    Clear,
}

pub fn run(cmd: CacheCommands, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    match cmd {
        CacheCommands::Rebuild => run_rebuild(&shop),
        CacheCommands::Sync => run_sync(&shop),
        CacheCommands::Status => run_status(&shop),
        CacheCommands::Clear => run_clear(&shop),
    }
}

fn run_rebuild(shop: &Shop) -> Result<()> {
    let mut cache = EntityCache::open_without_sync(&shop.project)?;

    println!("{} Rebuilding cache...", style("→").blue());
    let stats = cache.rebuild()?;

    println!("{} Cache rebuilt in {}ms", style("✓").green(), stats.duration_ms);
    println!("  Files scanned:  {}", stats.files_scanned);
    println!("  Records cached: {}", stats.entities_added);
    Ok(())
}

fn run_sync(shop: &Shop) -> Result<()> {
    let mut cache = EntityCache::open_without_sync(&shop.project)?;
    let stats = cache.sync()?;

    if stats.entities_added == 0 && stats.entities_updated == 0 && stats.entities_removed == 0 {
        println!("{} Cache is up to date", style("✓").green());
        return Ok(());
    }

    println!("{} Cache synced in {}ms", style("✓").green(), stats.duration_ms);
    if stats.entities_added > 0 {
        println!("  Added:   {}", style(stats.entities_added).green());
    }
    if stats.entities_updated > 0 {
        println!("  Updated: {}", style(stats.entities_updated).yellow());
    }
    if stats.entities_removed > 0 {
        println!("  Removed: {}", style(stats.entities_removed).red());
    }
    Ok(())
}

fn run_status(shop: &Shop) -> Result<()> {
    let cache = EntityCache::open(&shop.project)?;
    let stats = cache.statistics()?;

    println!("{}", style("Cache Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Location:      {}", EntityCache::path(&shop.project).display());
    println!("  Total records: {}", style(stats.total_entities).cyan());
    println!("  Database size: {} KB", style(stats.db_size_bytes / 1024).cyan());

    if !stats.by_prefix.is_empty() {
        println!();
        println!("  {}", style("By Type:").bold());
        let mut prefixes: Vec<_> = stats.by_prefix.iter().collect();
        prefixes.sort_by_key(|(k, _)| *k);
        for (prefix, count) in prefixes {
            println!("    {:<6} {}", prefix, count);
        }
    }
    Ok(())
}

fn run_clear(shop: &Shop) -> Result<()> {
    let path = EntityCache::path(&shop.project);
    if !path.exists() {
        println!("{} No cache to clear", style("✓").green());
        return Ok(());
    }

    std::fs::remove_file(&path).into_diagnostic()?;
    for suffix in ["-wal", "-shm"] {
        let side = path.with_file_name(format!("cache.db{}", suffix));
        if side.exists() {
            std::fs::remove_file(side).into_diagnostic()?;
        }
    }
    println!("{} Cache cleared", style("✓").green());
    Ok(())
}
