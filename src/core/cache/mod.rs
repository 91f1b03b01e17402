//! SQLite-backed record cache for reports
//!
//! This module provides a local SQLite mirror of the YAML records that:
//! - Caches record metadata for fast listing
//! - Keeps work-order figures and drill-sheet spans for the shop reports
//! - Auto-detects file changes and syncs incrementally
//!
//! The cache is user-local and gitignored; it can always be rebuilt from
//! the record files.

mod queries;
mod schema;
mod sync;
mod types;

pub use types::*;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::core::project::{Project, RECORD_SUFFIX};

/// Cache file name within `.proshop/`
const CACHE_FILE: &str = "cache.db";

/// Current schema version - cache is rebuilt on version mismatch
const SCHEMA_VERSION: i32 = 1;

/// The record cache backed by SQLite
pub struct EntityCache {
    conn: Connection,
    project: Project,
}

impl EntityCache {
    /// Open or create the cache for a project
    ///
    /// A missing cache is created and populated; an existing one is synced
    /// with any files that changed since it was last used.
    pub fn open(project: &Project) -> Result<Self> {
        let (mut cache, needs_init) = Self::connect(project)?;

        if needs_init {
            cache.init_schema()?;
            cache.rebuild()?;
        } else {
            if cache.needs_schema_rebuild()? {
                cache.reinitialize_schema()?;
            }
            cache.auto_sync()?;
        }

        Ok(cache)
    }

    /// Open cache without auto-sync
    pub fn open_without_sync(project: &Project) -> Result<Self> {
        let (mut cache, needs_init) = Self::connect(project)?;
        if needs_init {
            cache.init_schema()?;
        }
        Ok(cache)
    }

    fn connect(project: &Project) -> Result<(Self, bool)> {
        let cache_path = Self::path(project);
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        let needs_init = !cache_path.exists();
        let conn = Connection::open(&cache_path).into_diagnostic()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        let cache = Self {
            conn,
            project: project.clone(),
        };
        Ok((cache, needs_init))
    }

    /// Location of the cache database
    pub fn path(project: &Project) -> PathBuf {
        project.shop_dir().join(CACHE_FILE)
    }

    fn project_root(&self) -> &Path {
        self.project.root()
    }

    /// Check if schema version matches current version
    fn needs_schema_rebuild(&self) -> Result<bool> {
        let current_version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        Ok(current_version != SCHEMA_VERSION)
    }

    /// Drop all tables and reinitialize schema, then rebuild
    fn reinitialize_schema(&mut self) -> Result<()> {
        tracing::info!("cache schema changed, rebuilding");
        self.conn
            .execute_batch(
                r#"
                DROP TABLE IF EXISTS schema_version;
                DROP TABLE IF EXISTS work_orders;
                DROP TABLE IF EXISTS drill_sheets;
                DROP TABLE IF EXISTS entities;
                "#,
            )
            .into_diagnostic()?;

        self.init_schema()?;
        self.rebuild()?;
        Ok(())
    }

    /// Auto-sync: quickly check if any files changed and sync if needed
    fn auto_sync(&mut self) -> Result<()> {
        let cached_max_mtime: Option<i64> = self
            .conn
            .query_row("SELECT MAX(file_mtime) FROM entities", [], |row| row.get(0))
            .optional()
            .into_diagnostic()?
            .flatten();

        if self.has_newer_files(cached_max_mtime.unwrap_or(0))? {
            let stats = self.sync()?;
            tracing::debug!(
                added = stats.entities_added,
                updated = stats.entities_updated,
                removed = stats.entities_removed,
                "cache synced"
            );
        }

        Ok(())
    }

    /// Check for files newer than the cache, or added/removed files
    fn has_newer_files(&self, max_cached_mtime: i64) -> Result<bool> {
        let mut actual_count = 0i64;
        for path in self.record_files() {
            if get_file_mtime(&path)? > max_cached_mtime {
                return Ok(true);
            }
            actual_count += 1;
        }

        let cached_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .into_diagnostic()?;

        Ok(actual_count != cached_count)
    }

    /// Every record file in the project
    fn record_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        crate::core::identity::EntityPrefix::all()
            .iter()
            .flat_map(|prefix| self.project.iter_entity_files(*prefix))
    }

    /// Count cached records grouped by prefix (record type)
    pub fn count_by_prefix(&self) -> Vec<GroupCount> {
        let mut stmt = match self.conn.prepare(
            "SELECT prefix, COUNT(*) as cnt FROM entities GROUP BY prefix ORDER BY cnt DESC, prefix",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let rows = match stmt.query_map([], |row| {
            Ok(GroupCount {
                group: row.get(0)?,
                count: row.get::<_, i64>(1)? as usize,
            })
        }) {
            Ok(r) => r,
            Err(_) => return vec![],
        };

        rows.filter_map(|r| r.ok()).collect()
    }

    /// Get cache statistics
    pub fn statistics(&self) -> Result<CacheStats> {
        let total_entities: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .into_diagnostic()?;

        let by_prefix: HashMap<String, usize> = self
            .count_by_prefix()
            .into_iter()
            .map(|g| (g.group, g.count))
            .collect();

        let db_size_bytes = fs::metadata(Self::path(&self.project))
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(CacheStats {
            total_entities,
            by_prefix,
            db_size_bytes,
        })
    }
}

/// Get file modification time as Unix timestamp
fn get_file_mtime(path: &Path) -> Result<i64> {
    let metadata = fs::metadata(path).into_diagnostic()?;
    let mtime = metadata
        .modified()
        .into_diagnostic()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(mtime)
}

/// Compute SHA256 hash of content
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parse a stored RFC 3339 timestamp; unreadable values become the epoch
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn is_record_file(path: &Path) -> bool {
    path.to_string_lossy().ends_with(RECORD_SUFFIX)
}
