//! Short ID aliases for easier record selection
//!
//! Listing records assigns aliases like `DRL@1`, `DRL@2` in listing order.
//! They are saved in `.proshop/shortids.json` and replaced by the next
//! listing of the same record type.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;

const INDEX_FILE: &str = "shortids.json";

/// Per-type lists of record ids; alias `N` is position `N - 1`
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    entries: BTreeMap<String, Vec<String>>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn path(project: &Project) -> PathBuf {
        project.shop_dir().join(INDEX_FILE)
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        fs::read_to_string(Self::path(project))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(project), content)
    }

    /// Replace the aliases of one record type
    pub fn rebuild<'a>(&mut self, prefix: EntityPrefix, ids: impl IntoIterator<Item = &'a EntityId>) {
        self.entries.insert(
            prefix.as_str().to_string(),
            ids.into_iter().map(|id| id.to_string()).collect(),
        );
    }

    /// Resolve `PREFIX@N` to a full id string
    ///
    /// Anything that is not an alias is returned unchanged, for the caller to
    /// treat as a full or partial id. Unknown aliases give `None`.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let Some((prefix, number)) = reference.split_once('@') else {
            return Some(reference.to_string());
        };
        let prefix: EntityPrefix = prefix.parse().ok()?;
        let n: usize = number.parse().ok()?;
        self.entries
            .get(prefix.as_str())?
            .get(n.checked_sub(1)?)
            .cloned()
    }

    /// Alias of a record, if it appeared in the last listing of its type
    pub fn short_id(&self, id: &EntityId) -> Option<String> {
        let needle = id.to_string();
        let list = self.entries.get(id.prefix().as_str())?;
        let pos = list.iter().position(|s| *s == needle)?;
        Some(format!("{}@{}", id.prefix(), pos + 1))
    }

    /// Alias if known, else the full id
    pub fn display(&self, id: &EntityId) -> String {
        self.short_id(id).unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
