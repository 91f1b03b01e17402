//! Pro Shop Toolkit
//!
//! Customer, ball, drill-sheet and work-order records for a bowling pro
//! shop, kept as plain YAML files with a SQLite cache for reports.

pub mod cli;
pub mod core;
pub mod entities;
pub mod forms;
pub mod schema;
pub mod yaml;
