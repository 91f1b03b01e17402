//! CLI command implementations

pub mod ball;
pub mod cache;
pub mod completions;
pub mod config;
pub mod customer;
pub mod drill;
pub mod employee;
pub mod init;
pub mod location;
pub mod report;
pub mod team;
pub mod validate;
pub mod wo;
