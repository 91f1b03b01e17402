//! Cache result types

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::identity::EntityPrefix;

/// Common metadata of a cached record
#[derive(Debug, Clone)]
pub struct CachedEntity {
    pub id: String,
    pub prefix: String,
    pub title: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub file_path: PathBuf,
    pub customer_id: Option<String>,
    pub pro_shop_id: String,
}

// =========================================================================
// Aggregate Query Result Types
// =========================================================================

/// Count of records grouped by a field
#[derive(Debug, Clone)]
pub struct GroupCount {
    pub group: String,
    pub count: usize,
}

/// Work-order activity over a trailing window
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ShopSummary {
    /// Customers with at least one work order in the window
    pub distinct_customers: usize,
    pub work_orders: usize,
    /// Mean satisfaction over scored orders; absent when none were scored
    pub avg_satisfaction: Option<f64>,
    pub total_cost: f64,
}

/// Span averages for one grip style
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GripStyleStats {
    pub grip_style: String,
    pub avg_thumb_to_middle: Option<f64>,
    pub avg_thumb_to_ring: Option<f64>,
    pub count: usize,
}

// =========================================================================
// Operation Result Types
// =========================================================================

/// Statistics from sync operation
#[derive(Debug, Default)]
pub struct SyncStats {
    pub files_scanned: usize,
    pub entities_added: usize,
    pub entities_updated: usize,
    pub entities_removed: usize,
    pub duration_ms: u64,
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_entities: usize,
    pub by_prefix: HashMap<String, usize>,
    pub db_size_bytes: u64,
}

/// Filter for listing cached records
#[derive(Debug, Default)]
pub struct EntityFilter {
    pub prefix: Option<EntityPrefix>,
    pub customer_id: Option<String>,
    pub pro_shop_id: Option<String>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    pub limit: Option<usize>,
}
