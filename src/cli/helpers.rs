//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cache::{EntityCache, EntityFilter};
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::service::{SaveContext, SaveError};
use crate::core::shortid::ShortIdIndex;
use crate::core::store::{RecordFilter, RecordStore, YamlStore};
use crate::core::team::{self, Operation};
use crate::core::Config;
use crate::forms;

/// Everything a record command needs: the project, its config and store
pub struct Shop {
    pub project: Project,
    pub config: Config,
    pub store: YamlStore,
}

impl Shop {
    /// Open the project named by `--project`, or the one above the current directory
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load_for(Some(&project));
        let store = YamlStore::new(project.clone());
        Ok(Self {
            project,
            config,
            store,
        })
    }

    pub fn save_context(&self) -> SaveContext {
        SaveContext {
            author: self.config.author(),
            pro_shop_id: self.config.shop_id(),
        }
    }

    /// Fail unless the current user may perform `op` on `prefix` records
    pub fn authorize(&self, prefix: EntityPrefix, op: Operation) -> Result<()> {
        team::authorize(&self.project, &self.config.author(), prefix, op)
            .map_err(|e| miette::miette!("{}", e))
    }

    /// Resolve a full id, partial id or `PREFIX@N` alias to a record id
    pub fn resolve_id(&self, prefix: EntityPrefix, reference: &str) -> Result<EntityId> {
        let short_ids = ShortIdIndex::load(&self.project);
        let resolved = short_ids
            .resolve(reference)
            .ok_or_else(|| miette::miette!("Unknown short ID '{}'. Run a list command first.", reference))?;

        if let Ok(id) = resolved.parse::<EntityId>() {
            if id.prefix() == prefix {
                return Ok(id);
            }
            return Err(miette::miette!("'{}' is not a {} ID", reference, prefix.label()));
        }

        let path = self
            .store
            .find_file(prefix, &resolved)
            .ok_or_else(|| miette::miette!("No {} found matching '{}'", prefix.label(), reference))?;
        crate::core::store::file_id(&path)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| miette::miette!("No {} found matching '{}'", prefix.label(), reference))
    }

    /// Resolve an optional reference given on the command line
    pub fn resolve_opt(&self, prefix: EntityPrefix, reference: Option<&str>) -> Result<Option<EntityId>> {
        reference.map(|r| self.resolve_id(prefix, r)).transpose()
    }

    /// Load a record by any accepted reference
    pub fn load<T: Entity>(&self, reference: &str) -> Result<T> {
        let id = self.resolve_id(T::PREFIX, reference)?;
        self.store
            .get::<T>(&id)
            .into_diagnostic()?
            .ok_or_else(|| miette::miette!("No {} found matching '{}'", T::PREFIX.label(), reference))
    }

    /// Records of one type, optionally narrowed to a customer
    pub fn list<T: Entity>(&self, customer_id: Option<EntityId>) -> Result<Vec<T>> {
        let filter = RecordFilter {
            customer_id,
            pro_shop_id: None,
        };
        self.store.list::<T>(&filter).into_diagnostic()
    }

    /// Delete a record after checking permissions and owned records
    ///
    /// Customers that still own records are kept unless `force` is set.
    pub fn delete(&mut self, prefix: EntityPrefix, reference: &str, force: bool) -> Result<EntityId> {
        self.authorize(prefix, Operation::Delete)?;
        let id = self.resolve_id(prefix, reference)?;

        if prefix == EntityPrefix::Cust && !force {
            let cache = EntityCache::open(&self.project)?;
            let owned = cache.list_entities(&EntityFilter {
                customer_id: Some(id.to_string()),
                ..EntityFilter::default()
            });
            if !owned.is_empty() {
                let ids: Vec<String> = owned.iter().map(|e| e.id.clone()).collect();
                return Err(miette::miette!(
                    "Customer '{}' still owns {} record(s): {}\nUse --force to delete anyway.",
                    id,
                    owned.len(),
                    ids.join(", ")
                ));
            }
        }

        if !self.store.delete(&id).into_diagnostic()? {
            return Err(miette::miette!("No {} found matching '{}'", prefix.label(), reference));
        }
        Ok(id)
    }

    /// Record the listing order so `PREFIX@N` aliases resolve
    pub fn remember_listing<'a>(
        &self,
        prefix: EntityPrefix,
        ids: impl IntoIterator<Item = &'a EntityId>,
    ) -> ShortIdIndex {
        let mut short_ids = ShortIdIndex::load(&self.project);
        short_ids.rebuild(prefix, ids);
        if let Err(e) = short_ids.save(&self.project) {
            tracing::warn!(error = %e, "could not save short IDs");
        }
        short_ids
    }

    pub fn short_ids(&self) -> ShortIdIndex {
        ShortIdIndex::load(&self.project)
    }

    /// Open a record in the editor, then re-check it against the form rules
    pub fn edit(&self, prefix: EntityPrefix, reference: &str) -> Result<()> {
        self.authorize(prefix, Operation::Update)?;
        let id = self.resolve_id(prefix, reference)?;
        let path = self.store.path_of(&id);
        if !path.exists() {
            return Err(miette::miette!("No {} found matching '{}'", prefix.label(), reference));
        }

        println!("Opening {} in {}...", style(&id).cyan(), style(self.config.editor()).yellow());
        self.config.run_editor(&path).into_diagnostic()?;

        let document = YamlStore::read_file(&path).into_diagnostic()?;
        let errors = forms::check_document(prefix, document).map_err(|e| {
            miette::miette!("{} no longer decodes as a {}: {}", path.display(), prefix.label(), e)
        })?;
        if errors.is_empty() {
            println!("{} Saved {}", style("✓").green(), style(&id).cyan());
        } else {
            println!("{} {} has problems:", style("!").yellow(), style(&id).cyan());
            for (field, message) in errors.iter() {
                println!("  {} {}: {}", style("✗").red(), style(field).yellow(), message);
            }
        }
        Ok(())
    }
}

/// Turn a failed save into a diagnostic, one line per invalid field
pub fn save_failed(err: SaveError) -> miette::Report {
    match err {
        SaveError::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {} {}: {}", style("✗").red(), style(field).yellow(), message);
            }
            miette::miette!("Validation failed; nothing was saved")
        }
        other => miette::miette!("{}", other),
    }
}

/// Print one record in a structured format; false when the caller should pretty-print
pub fn print_structured<T: Serialize>(record: &T, id: &EntityId, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(record).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", id),
        _ => return Ok(false),
    }
    Ok(true)
}

/// Report a created or changed record
pub fn print_saved(global: &GlobalOpts, verb: &str, label: &str, id: &EntityId, detail: &str) {
    if global.quiet {
        println!("{}", id);
        return;
    }
    println!("{} {} {} {}", style("✓").green(), verb, label, style(id).cyan());
    if !detail.is_empty() {
        println!("   {}", style(detail).dim());
    }
}

/// Parse an optional money or hours value typed by the user
pub fn parse_amount(field: &str, value: Option<&str>) -> Result<Option<f64>> {
    value
        .map(|v| {
            v.trim()
                .trim_start_matches('$')
                .parse::<f64>()
                .map_err(|_| miette::miette!("{} must be a number, got '{}'", field, v))
        })
        .transpose()
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output (RFC 4180)
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Dollar amount, or "-" when absent
pub fn format_money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("${:.2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("cost", Some("$12.50")).unwrap(), Some(12.5));
        assert_eq!(parse_amount("cost", None).unwrap(), None);
        assert!(parse_amount("cost", Some("lots")).is_err());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Some(45.0)), "$45.00");
        assert_eq!(format_money(None), "-");
    }
}
