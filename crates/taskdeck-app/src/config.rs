//! Configuration loaded from the user's `config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use taskdeck_core::{SortDirection, SortKey, TaskFilter, ViewConfig};

const APP_DIR: &str = "taskdeck";
const CONFIG_FILE: &str = "config.toml";
const DATA_FILE: &str = "tasks.json";

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Data file settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Initial view settings.
    #[serde(default)]
    pub view: ViewDefaults,
}

impl ProjectConfig {
    /// Load configuration from `path`, or from the platform default location
    /// when `path` is `None`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            return Ok(Self::default());
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", config_path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Fails on malformed TOML or unknown enum values.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve the data file: the configured path, else the platform data dir.
    ///
    /// # Errors
    /// Fails when no path is configured and the platform has no data directory.
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(DATA_FILE))
            .ok_or_else(|| anyhow!("no data directory available; set [storage] path or pass --data"))
    }
}

/// `[storage]` block.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Explicit data file location.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// `[view]` block: the initial view for listing commands.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub struct ViewDefaults {
    /// Primary filter.
    #[serde(default)]
    pub filter: TaskFilter,
    /// Sort key.
    #[serde(default)]
    pub sort: SortKey,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl From<ViewDefaults> for ViewConfig {
    fn from(defaults: ViewDefaults) -> Self {
        Self {
            filter: defaults.filter,
            sort_key: defaults.sort,
            sort_direction: defaults.direction,
            ..Self::default()
        }
    }
}

/// `$XDG_CONFIG_HOME/taskdeck/config.toml` or the platform equivalent.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
