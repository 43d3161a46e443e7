use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use importer_api::anilist::ClientOptions;

use crate::error::ImporterError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub anilist: AniListConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory location.
    pub database: Option<PathBuf>,
}

impl AppConfig {
    /// Load config: the user file if it exists, otherwise built-in defaults.
    pub fn load() -> Result<Self, ImporterError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Self::parse(DEFAULT_CONFIG)
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ImporterError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ImporterError::Config(e.to_string()))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, ImporterError> {
        toml::from_str(content).map_err(|e| ImporterError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), ImporterError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ImporterError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ImporterError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file, honouring `storage.database`.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.database {
            return path.clone();
        }
        Self::project_dirs()
            .map(|d| d.data_dir().join("importer.db"))
            .unwrap_or_else(|| PathBuf::from("importer.db"))
    }

    /// Ensure the database's parent directory exists and return its path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, ImporterError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Lookup client settings derived from the `[anilist]` section.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: self.anilist.endpoint.clone(),
            timeout: Duration::from_secs(self.anilist.timeout_secs),
            connect_timeout: Duration::from_secs(self.anilist.connect_timeout_secs),
            user_agent: self.anilist.user_agent.clone(),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "anilist-importer")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
