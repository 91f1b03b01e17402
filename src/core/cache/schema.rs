//! Database schema initialization

use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{EntityCache, SCHEMA_VERSION};

impl EntityCache {
    /// Initialize database schema
    pub(super) fn init_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Record metadata (common fields for all record types)
            CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                prefix TEXT NOT NULL,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                created TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_mtime INTEGER NOT NULL,
                file_hash TEXT NOT NULL,
                customer_id TEXT,
                pro_shop_id TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_entities_prefix ON entities(prefix);
            CREATE INDEX IF NOT EXISTS idx_entities_customer ON entities(customer_id);
            CREATE INDEX IF NOT EXISTS idx_entities_file_path ON entities(file_path);

            -- Work-order figures for the activity summary
            CREATE TABLE IF NOT EXISTS work_orders (
                id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL,
                employee_id TEXT,
                total_cost REAL NOT NULL DEFAULT 0,
                satisfaction INTEGER,
                created_ts INTEGER NOT NULL,
                FOREIGN KEY (id) REFERENCES entities(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_work_orders_created ON work_orders(created_ts);

            -- Drill-sheet measurements for grip statistics (stored after migration)
            CREATE TABLE IF NOT EXISTS drill_sheets (
                id TEXT PRIMARY KEY,
                grip_style TEXT NOT NULL,
                thumb_to_middle_fit REAL,
                thumb_to_ring_fit REAL,
                bridge_distance REAL NOT NULL,
                is_template INTEGER NOT NULL DEFAULT 0,
                customer_id TEXT,
                FOREIGN KEY (id) REFERENCES entities(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_drill_sheets_grip ON drill_sheets(grip_style);
            "#,
            )
            .into_diagnostic()?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .into_diagnostic()?;

        Ok(())
    }
}
