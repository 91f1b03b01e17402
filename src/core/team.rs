//! Team roster and role-based authorization
//!
//! Shops that keep a `.proshop/team.yaml` roster restrict who may change
//! which records. Without a roster every operation is allowed.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::EntityPrefix;
use crate::core::Project;

/// Roster file name inside `.proshop/`
pub const ROSTER_FILE: &str = "team.yaml";

/// Staff roles
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ShopManager,
    DrillTechnician,
    Apprentice,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::ShopManager => write!(f, "shop_manager"),
            Role::DrillTechnician => write!(f, "drill_technician"),
            Role::Apprentice => write!(f, "apprentice"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "shop_manager" | "manager" => Ok(Role::ShopManager),
            "drill_technician" | "technician" | "tech" => Ok(Role::DrillTechnician),
            "apprentice" => Ok(Role::Apprentice),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// What a caller wants to do with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

impl Role {
    /// Permission matrix
    ///
    /// | record type                              | manager | technician | apprentice    |
    /// |------------------------------------------|---------|------------|---------------|
    /// | customers, balls, drill sheets, orders   | all     | all        | read, update  |
    /// | employees, locations                     | all     | read       | read          |
    pub fn permits(&self, prefix: EntityPrefix, op: Operation) -> bool {
        let shop_floor = matches!(
            prefix,
            EntityPrefix::Cust | EntityPrefix::Ball | EntityPrefix::Drl | EntityPrefix::Wo
        );
        match self {
            Role::ShopManager => true,
            Role::DrillTechnician => shop_floor || op == Operation::Read,
            Role::Apprentice => {
                op == Operation::Read || (shop_floor && op == Operation::Update)
            }
        }
    }
}

/// A team member with their roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Matched against the configured author (or git user.name)
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether any of the member's roles allows the operation
    pub fn can(&self, prefix: EntityPrefix, op: Operation) -> bool {
        self.active && self.roles.iter().any(|r| r.permits(prefix, op))
    }
}

/// Authorization failure
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("'{user}' is not an active member of the team roster")]
    NotMember { user: String },

    #[error("'{user}' may not {operation} {record}s")]
    Denied {
        user: String,
        operation: Operation,
        record: &'static str,
    },

    #[error("team roster {path} is invalid: {message}")]
    Roster { path: PathBuf, message: String },
}

/// Team roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

fn default_version() -> u32 {
    1
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self {
            version: 1,
            members: Vec::new(),
        }
    }
}

impl TeamRoster {
    pub fn path(project: &Project) -> PathBuf {
        project.shop_dir().join(ROSTER_FILE)
    }

    /// Load the project's roster; `None` when the shop keeps none
    pub fn load(project: &Project) -> Result<Option<Self>, AccessError> {
        Self::load_from_path(&Self::path(project))
    }

    /// Load a roster file
    ///
    /// A roster that exists but cannot be parsed is an error rather than
    /// "no roster", which would allow everything.
    pub fn load_from_path(path: &Path) -> Result<Option<Self>, AccessError> {
        if !path.exists() {
            return Ok(None);
        }
        let invalid = |message: String| AccessError::Roster {
            path: path.to_path_buf(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_yml::from_str(&contents)
            .map(Some)
            .map_err(|e| invalid(e.to_string()))
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        self.save_to_path(&Self::path(project))
    }

    pub fn save_to_path(&self, path: &Path) -> std::io::Result<()> {
        let contents = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, contents)
    }

    /// Find an active member by username or display name
    pub fn find_member(&self, user: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| {
            m.active && (m.username.eq_ignore_ascii_case(user) || m.name.eq_ignore_ascii_case(user))
        })
    }

    pub fn add_member(&mut self, member: TeamMember) {
        self.members.push(member);
    }

    /// Remove a member by username
    pub fn remove_member(&mut self, username: &str) -> bool {
        let len_before = self.members.len();
        self.members
            .retain(|m| !m.username.eq_ignore_ascii_case(username));
        self.members.len() < len_before
    }

    pub fn active_members(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|m| m.active)
    }

    /// Check that `user` may perform `op` on records of type `prefix`
    pub fn authorize(
        &self,
        user: &str,
        prefix: EntityPrefix,
        op: Operation,
    ) -> Result<(), AccessError> {
        let member = self.find_member(user).ok_or_else(|| AccessError::NotMember {
            user: user.to_string(),
        })?;
        if member.can(prefix, op) {
            return Ok(());
        }
        tracing::warn!(user, %op, record = prefix.label(), "operation denied by team roster");
        Err(AccessError::Denied {
            user: user.to_string(),
            operation: op,
            record: prefix.label(),
        })
    }

    pub fn default_template() -> &'static str {
        r#"# Pro Shop Team Roster
# Once this file exists, only listed members may change records.
# Roles: shop_manager, drill_technician, apprentice

version: 1

members:
  # - name: "Jane Smith"
  #   email: "jane@example.com"
  #   username: "jsmith"        # Matches the configured author or git user.name
  #   roles: [shop_manager]
  #   active: true
  []
"#
    }
}

/// Project-level check used before every mutation
///
/// Allows everything when the shop has no roster.
pub fn authorize(
    project: &Project,
    user: &str,
    prefix: EntityPrefix,
    op: Operation,
) -> Result<(), AccessError> {
    match TeamRoster::load(project)? {
        Some(roster) => roster.authorize(user, prefix, op),
        None => Ok(()),
    }
}
