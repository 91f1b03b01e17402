//! Query methods for retrieving cached records and shop reports

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use rusqlite::{params, Row};

use super::{parse_datetime, CachedEntity, EntityCache, EntityFilter, GripStyleStats, ShopSummary};

const ENTITY_COLUMNS: &str =
    "id, prefix, title, author, created, file_path, customer_id, pro_shop_id";

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<CachedEntity> {
    Ok(CachedEntity {
        id: row.get(0)?,
        prefix: row.get(1)?,
        title: row.get(2)?,
        author: row.get(3)?,
        created: parse_datetime(&row.get::<_, String>(4)?),
        file_path: PathBuf::from(row.get::<_, String>(5)?),
        customer_id: row.get(6)?,
        pro_shop_id: row.get(7)?,
    })
}

impl EntityCache {
    /// List cached records with filters, newest first
    pub fn list_entities(&self, filter: &EntityFilter) -> Vec<CachedEntity> {
        let mut sql = format!("SELECT {} FROM entities WHERE 1=1", ENTITY_COLUMNS);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(prefix) = filter.prefix {
            sql.push_str(" AND prefix = ?");
            params_vec.push(Box::new(prefix.as_str().to_string()));
        }

        if let Some(ref customer_id) = filter.customer_id {
            sql.push_str(" AND customer_id = ?");
            params_vec.push(Box::new(customer_id.clone()));
        }

        if let Some(ref shop) = filter.pro_shop_id {
            sql.push_str(" AND pro_shop_id = ?");
            params_vec.push(Box::new(shop.clone()));
        }

        if let Some(ref search) = filter.search {
            sql.push_str(" AND (title LIKE ? OR id LIKE ?)");
            let pattern = format!("%{}%", search);
            params_vec.push(Box::new(pattern.clone()));
            params_vec.push(Box::new(pattern));
        }

        sql.push_str(" ORDER BY created DESC, id");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = match self.conn.prepare(&sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let rows = match stmt.query_map(params_refs.as_slice(), entity_from_row) {
            Ok(r) => r,
            Err(_) => return vec![],
        };

        rows.filter_map(|r| r.ok()).collect()
    }

    /// Work-order activity for orders created at or after `since`
    ///
    /// `avg_satisfaction` is `None` when no order in the window was scored.
    pub fn shop_summary(
        &self,
        since: DateTime<Utc>,
        pro_shop_id: Option<&str>,
    ) -> Result<ShopSummary> {
        self.conn
            .query_row(
                r#"SELECT COUNT(DISTINCT w.customer_id),
                          COUNT(*),
                          AVG(w.satisfaction),
                          COALESCE(SUM(w.total_cost), 0.0)
                   FROM work_orders w
                   JOIN entities e ON e.id = w.id
                   WHERE w.created_ts >= ?1
                     AND (?2 IS NULL OR e.pro_shop_id = ?2)"#,
                params![since.timestamp(), pro_shop_id],
                |row| {
                    Ok(ShopSummary {
                        distinct_customers: row.get::<_, i64>(0)? as usize,
                        work_orders: row.get::<_, i64>(1)? as usize,
                        avg_satisfaction: row.get(2)?,
                        total_cost: row.get(3)?,
                    })
                },
            )
            .into_diagnostic()
    }

    /// Average fit spans per grip style, most common style first
    ///
    /// Templates are not customer measurements and are left out.
    pub fn grip_style_stats(&self) -> Result<Vec<GripStyleStats>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"SELECT grip_style,
                          AVG(thumb_to_middle_fit),
                          AVG(thumb_to_ring_fit),
                          COUNT(*) AS cnt
                   FROM drill_sheets
                   WHERE is_template = 0
                   GROUP BY grip_style
                   ORDER BY cnt DESC, grip_style"#,
            )
            .into_diagnostic()?;

        let rows = stmt
            .query_map([], |row| {
                Ok(GripStyleStats {
                    grip_style: row.get(0)?,
                    avg_thumb_to_middle: row.get(1)?,
                    avg_thumb_to_ring: row.get(2)?,
                    count: row.get::<_, i64>(3)? as usize,
                })
            })
            .into_diagnostic()?;

        rows.collect::<rusqlite::Result<Vec<_>>>().into_diagnostic()
    }
}
