//! Core module - fundamental types and utilities

pub mod cache;
pub mod config;
pub mod entity;
pub mod identity;
pub mod project;
pub mod service;
pub mod shortid;
pub mod store;
pub mod team;

pub use cache::{CachedEntity, EntityCache, EntityFilter, GripStyleStats, ShopSummary, SyncStats};
pub use config::Config;
pub use entity::Entity;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use service::{SaveContext, SaveError};
pub use shortid::ShortIdIndex;
pub use store::{RecordFilter, RecordStore, StoreError, YamlStore};
pub use team::{AccessError, Operation, Role, TeamMember, TeamRoster};
