//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Shop id used when nothing is configured
pub const DEFAULT_SHOP_ID: &str = "main";

/// Pro-shop configuration with layered hierarchy
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Editor command for `edit` subcommands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Owning pro-shop identifier stamped on new records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,

    /// Business name shown on reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_address: Option<String>,
}

impl Config {
    /// Load configuration for the project found from the current directory
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        // 1. Built-in defaults (Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/proshop/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.proshop/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.shop_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(author) = std::env::var("PROSHOP_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(editor) = std::env::var("PROSHOP_EDITOR") {
            config.editor = Some(editor);
        }
        if let Ok(shop_id) = std::env::var("PROSHOP_SHOP_ID") {
            config.shop_id = Some(shop_id);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "proshop")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.shop_id.is_some() {
            self.shop_id = other.shop_id;
        }
        if other.shop_name.is_some() {
            self.shop_name = other.shop_name;
        }
        if other.shop_phone.is_some() {
            self.shop_phone = other.shop_phone;
        }
        if other.shop_address.is_some() {
            self.shop_address = other.shop_address;
        }
    }

    /// Owning shop id for new records
    pub fn shop_id(&self) -> String {
        self.shop_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHOP_ID.to_string())
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Run the editor on a file, handling commands with arguments
    /// (e.g., "code --wait")
    pub fn run_editor(&self, file_path: &Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();

        match parts.next() {
            Some(cmd) => std::process::Command::new(cmd)
                .args(parts)
                .arg(file_path)
                .status(),
            None => std::process::Command::new("vi").arg(file_path).status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            shop_id: Some("north".to_string()),
            shop_name: Some("North Lanes".to_string()),
            ..Config::default()
        };
        base.merge(Config {
            shop_name: Some("North Lanes Pro Shop".to_string()),
            ..Config::default()
        });

        assert_eq!(base.shop_id.as_deref(), Some("north"));
        assert_eq!(base.shop_name.as_deref(), Some("North Lanes Pro Shop"));
    }

    #[test]
    fn test_shop_id_defaults_when_blank() {
        let config = Config {
            shop_id: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.shop_id(), DEFAULT_SHOP_ID);
    }

    #[test]
    fn test_project_config_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.shop_dir().join("config.yaml"),
            "shop_id: west\nshop_name: West Side Bowl\n",
        )
        .unwrap();

        let config = Config::load_for(Some(&project));
        assert_eq!(config.shop_name.as_deref(), Some("West Side Bowl"));
    }
}
