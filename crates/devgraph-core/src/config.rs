use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use devgraph_api::{ClientConfig, RetryConfig};
use devgraph_storage::{KeyValueStore, MemoryStore, SqliteStore};

use crate::favorites::{FavoritesStore, DEFAULT_HISTORY_LIMIT};

/// Main configuration structure
///
/// Loaded from `config.toml`, then overridden by env vars and CLI flags in the
/// binary. Every section has defaults, so an empty file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load config from the default location, or defaults if there is none
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// `<config dir>/devgraph/config.toml` (XDG on Linux, AppData on Windows)
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("devgraph");

        Ok(config_dir.join("config.toml"))
    }

    /// Where the favorites database lives
    pub fn db_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.storage.db_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("devgraph");

        Ok(data_dir.join("favorites.db"))
    }

    /// Favorites over SQLite at [`Config::db_path`], or in memory when `ephemeral`
    pub fn open_favorites(
        &self,
        ephemeral: bool,
    ) -> crate::Result<FavoritesStore<Box<dyn KeyValueStore>>> {
        let storage: Box<dyn KeyValueStore> = if ephemeral {
            Box::new(MemoryStore::new())
        } else {
            Box::new(SqliteStore::open(self.db_path()?)?)
        };

        Ok(FavoritesStore::new(storage).with_history_limit(self.history.limit))
    }

    /// Everything the GitHub client needs
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.github.api_url.clone(),
            token: self.github.token.clone(),
            cache_ttl: Duration::from_secs(self.provider.cache_ttl_secs),
            retry: RetryConfig::fixed(self.provider.max_retries, self.provider.retry_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Optional personal access token - raises the anonymous rate limit
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// How long identical requests are served from memory
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between retries
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_interval() -> u64 {
    5000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            max_retries: default_max_retries(),
            retry_interval_ms: default_retry_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the favorites database location
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}
