//! Configuration handling for the plugin

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::form::DEFAULT_FIELDS_GROUP;

fn default_fields_group() -> String {
    DEFAULT_FIELDS_GROUP.to_string()
}

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Components (e.g. `com_users`) the plugin leaves alone
    #[serde(default)]
    pub disabled_components: Vec<String>,
    /// Keep `[AND]`/`[OR]` when rewriting subform showon attributes
    #[serde(default)]
    pub rejoin_delimiters: bool,
    /// Form group holding the custom fields
    #[serde(default = "default_fields_group")]
    pub fields_group: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            disabled_components: Vec::new(),
            rejoin_delimiters: false,
            fields_group: default_fields_group(),
        }
    }
}

impl PluginConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "fieldsshowon", "fields-showon")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config directory
    pub fn load() -> Result<Self> {
        Self::load_or_default(Self::config_path().as_deref())
    }

    /// Defaults when there is no file at `path`
    fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: PluginConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Whether a usage context such as `com_users.user` is switched off
    pub fn is_disabled(&self, context: &str) -> bool {
        self.disabled_components
            .iter()
            .any(|component| context.starts_with(&format!("{component}.")))
    }

    /// Whether a field definition context such as
    /// `com_fields.field.com_users.user` targets a switched off component
    pub fn is_definition_disabled(&self, context: &str, prefix: &str) -> bool {
        self.disabled_components
            .iter()
            .any(|component| context.starts_with(&format!("{prefix}{component}")))
    }
}
