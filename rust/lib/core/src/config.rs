//! Application configuration.
//!
//! Read from `~/.heroes/config.toml` by default. Every field has a default,
//! so an absent file or a partial file is valid:
//!
//! ```toml
//! platform = "browser"
//! data_dir = "/var/lib/heroes"
//! seed_path = "seed.json"
//!
//! [store]
//! storage_key = "heroState"
//! items_per_page = 6
//! strict = false
//!
//! [loading]
//! min_duration_ms = 500
//! mode = "flag"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::platform::Platform;

/// Storage key the store snapshot lives under.
pub const DEFAULT_STORAGE_KEY: &str = "heroState";
pub const DEFAULT_ITEMS_PER_PAGE: usize = 6;
pub const DEFAULT_MIN_LOADING_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Browser persists to local storage; server keeps state in memory only.
    pub platform: Platform,

    /// Directory holding the local storage database.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb file. Defaults to `{data_dir}/heroes.redb`.
    pub db_path: Option<PathBuf>,

    /// JSON array of heroes used as the initial collection when no stored
    /// snapshot exists.
    pub seed_path: Option<PathBuf>,

    pub store: StoreConfig,
    pub loading: LoadingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub storage_key: String,
    pub items_per_page: usize,
    /// Reject unknown publishers and ratings outside 1–5 on creation.
    pub strict: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Minimum time the loading flag stays raised after a request settles.
    pub min_duration_ms: u64,
    pub mode: LoadingMode,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: DEFAULT_MIN_LOADING_MS,
            mode: LoadingMode::Flag,
        }
    }
}

/// How overlapping requests drive the loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingMode {
    /// Plain boolean: any request settling clears the flag, even while
    /// others are still in flight.
    #[default]
    Flag,
    /// In-flight counter: the flag clears when the last request settles.
    Counted,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Browser,
            data_dir: None,
            db_path: None,
            seed_path: None,
            store: StoreConfig::default(),
            loading: LoadingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default config file path: ~/.heroes/config.toml.
    pub fn default_path() -> PathBuf {
        home_dir().join("config.toml")
    }

    /// Load config from disk, or return the default if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("store.storage_key is empty".into()));
        }
        if self.store.items_per_page == 0 {
            return Err(ConfigError::Invalid(
                "store.items_per_page must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the redb path, falling back to `{data_dir}/heroes.redb`, then
    /// `~/.heroes/heroes.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        self.data_dir
            .clone()
            .unwrap_or_else(home_dir)
            .join("heroes.redb")
    }

    pub fn min_loading_duration(&self) -> Duration {
        Duration::from_millis(self.loading.min_duration_ms)
    }
}

/// The heroes config directory (~/.heroes).
fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".heroes")
}
