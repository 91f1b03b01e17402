//! Cache synchronization with filesystem
//!
//! Methods for rebuilding and incrementally syncing the cache with YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use rusqlite::{params, OptionalExtension};
use walkdir::WalkDir;

use super::{compute_hash, get_file_mtime, is_record_file, EntityCache, SyncStats};
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::entities::{DrillSheet, WorkOrder};

/// Fields every cached record carries
struct RecordMeta {
    id: EntityId,
    title: String,
    author: String,
    created: String,
    customer_id: Option<String>,
    pro_shop_id: String,
}

impl RecordMeta {
    fn of<T: Entity>(record: &T) -> Self {
        Self {
            id: record.id().clone(),
            title: record.title().to_string(),
            author: record.author().to_string(),
            created: record.created().to_rfc3339(),
            customer_id: record.customer_id().map(|c| c.to_string()),
            pro_shop_id: record.pro_shop_id().to_string(),
        }
    }
}

impl EntityCache {
    /// Full rebuild of cache from filesystem
    pub fn rebuild(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        self.conn
            .execute_batch(
                r#"
            DELETE FROM work_orders;
            DELETE FROM drill_sheets;
            DELETE FROM entities;
            "#,
            )
            .into_diagnostic()?;

        for prefix in EntityPrefix::all() {
            let full_path = self.project_root().join(Project::entity_directory(*prefix));
            if full_path.exists() {
                self.scan_directory(&full_path, &mut stats)?;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            files = stats.files_scanned,
            cached = stats.entities_added,
            "cache rebuilt"
        );
        Ok(stats)
    }

    /// Scan a directory and cache all records
    pub(super) fn scan_directory(&mut self, dir: &Path, stats: &mut SyncStats) -> Result<()> {
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !is_record_file(path) {
                continue;
            }

            stats.files_scanned += 1;

            if let Err(e) = self.cache_entity_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to cache record");
            } else {
                stats.entities_added += 1;
            }
        }

        Ok(())
    }

    /// Cache a single record file
    ///
    /// The file is decoded into its typed record first, so drill sheets are
    /// cached in their migrated layout.
    pub(super) fn cache_entity_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).into_diagnostic()?;
        let mtime = get_file_mtime(path)?;
        let hash = compute_hash(&content);
        let rel_path = self.relative_path(path);

        let prefix = EntityPrefix::from_path(path)
            .ok_or_else(|| miette::miette!("Unrecognized record file name"))?;
        let value: serde_json::Value = serde_yml::from_str(&content).into_diagnostic()?;

        let meta = match prefix {
            EntityPrefix::Cust => RecordMeta::of(&decode::<crate::entities::Customer>(value)?),
            EntityPrefix::Ball => RecordMeta::of(&decode::<crate::entities::BowlingBall>(value)?),
            EntityPrefix::Emp => RecordMeta::of(&decode::<crate::entities::Employee>(value)?),
            EntityPrefix::Loc => RecordMeta::of(&decode::<crate::entities::Location>(value)?),
            EntityPrefix::Drl => {
                let sheet = decode::<DrillSheet>(value)?;
                self.cache_drill_sheet_data(&sheet)?;
                RecordMeta::of(&sheet)
            }
            EntityPrefix::Wo => {
                let order = decode::<WorkOrder>(value)?;
                self.cache_work_order_data(&order)?;
                RecordMeta::of(&order)
            }
        };

        self.conn
            .execute(
                r#"INSERT OR REPLACE INTO entities
                   (id, prefix, title, author, created, file_path, file_mtime, file_hash,
                    customer_id, pro_shop_id)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                params![
                    meta.id.to_string(),
                    prefix.as_str(),
                    meta.title,
                    meta.author,
                    meta.created,
                    rel_path,
                    mtime,
                    hash,
                    meta.customer_id,
                    meta.pro_shop_id
                ],
            )
            .into_diagnostic()?;

        Ok(())
    }

    fn cache_work_order_data(&self, order: &WorkOrder) -> Result<()> {
        self.conn
            .execute(
                r#"INSERT OR REPLACE INTO work_orders
                   (id, customer_id, employee_id, total_cost, satisfaction, created_ts)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![
                    order.id.to_string(),
                    order.customer_id.to_string(),
                    order.employee_id.as_ref().map(|e| e.to_string()),
                    order.total_cost,
                    order.satisfaction,
                    order.created.timestamp()
                ],
            )
            .into_diagnostic()?;
        Ok(())
    }

    fn cache_drill_sheet_data(&self, sheet: &DrillSheet) -> Result<()> {
        self.conn
            .execute(
                r#"INSERT OR REPLACE INTO drill_sheets
                   (id, grip_style, thumb_to_middle_fit, thumb_to_ring_fit, bridge_distance,
                    is_template, customer_id)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![
                    sheet.id.to_string(),
                    sheet.grip_style.to_string(),
                    sheet.thumb_to_middle(),
                    sheet.thumb_to_ring(),
                    sheet.bridge.distance,
                    sheet.is_template,
                    sheet.customer_id.as_ref().map(|c| c.to_string())
                ],
            )
            .into_diagnostic()?;
        Ok(())
    }

    /// Incremental sync - only update changed files
    pub fn sync(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        let mut current_files: HashMap<String, PathBuf> = HashMap::new();
        for path in self.record_files().collect::<Vec<_>>() {
            current_files.insert(self.relative_path(&path), path);
            stats.files_scanned += 1;
        }

        let mut cached_files: HashMap<String, (i64, String)> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT file_path, file_mtime, file_hash FROM entities")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .into_diagnostic()?;

            for row in rows {
                let (path, mtime, hash) = row.into_diagnostic()?;
                cached_files.insert(path, (mtime, hash));
            }
        }

        for (rel_path, full_path) in &current_files {
            let needs_update = match cached_files.get(rel_path) {
                Some((cached_mtime, cached_hash)) => {
                    let current_mtime = get_file_mtime(full_path)?;
                    if current_mtime != *cached_mtime {
                        let content = fs::read_to_string(full_path).into_diagnostic()?;
                        compute_hash(&content) != *cached_hash
                    } else {
                        false
                    }
                }
                None => true,
            };

            if !needs_update {
                continue;
            }
            if let Err(e) = self.cache_entity_file(full_path) {
                tracing::warn!(path = %full_path.display(), error = %e, "failed to cache record");
                continue;
            }
            if cached_files.contains_key(rel_path) {
                stats.entities_updated += 1;
            } else {
                stats.entities_added += 1;
            }
        }

        for rel_path in cached_files.keys() {
            if current_files.contains_key(rel_path) {
                continue;
            }
            let entity_id: Option<String> = self
                .conn
                .query_row(
                    "SELECT id FROM entities WHERE file_path = ?1",
                    params![rel_path],
                    |row| row.get(0),
                )
                .optional()
                .into_diagnostic()?;

            if let Some(id) = entity_id {
                self.remove_entity(&id)?;
                stats.entities_removed += 1;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// Remove a record from the cache
    pub(super) fn remove_entity(&self, id: &str) -> Result<()> {
        for table in ["work_orders", "drill_sheets", "entities"] {
            self.conn
                .execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])
                .into_diagnostic()?;
        }
        Ok(())
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(self.project_root())
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

fn decode<T: Entity>(value: serde_json::Value) -> Result<T> {
    T::from_value(value).into_diagnostic()
}
