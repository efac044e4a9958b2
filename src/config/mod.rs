//! Configuration management for cpan-index

pub mod schema;

pub use schema::{CacheConfig, Config, NetworkConfig, SourceConfig, DEFAULT_SOURCE_URL};

use crate::error::{IndexError, IndexResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use url::Url;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cpan-index")
            .join("config.toml")
    }

    /// Default cache directory for a source URL:
    /// `~/.perl-cpm/sources/<scheme>%<host>[%<port>]`
    pub fn default_cache_dir(url: &Url) -> IndexResult<PathBuf> {
        let home = dirs::home_dir().ok_or(IndexError::HomeDirUnavailable)?;
        Ok(home
            .join(".perl-cpm")
            .join("sources")
            .join(source_dir_name(url)?))
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> IndexResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> IndexResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| IndexError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| IndexError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> IndexResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            IndexError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> IndexResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| IndexError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Parsed source URL
    pub fn source_url(&self) -> IndexResult<Url> {
        Url::parse(&self.source.url)
            .map_err(|e| IndexError::invalid_url(self.source.url.as_str(), e.to_string()))
    }

    /// Directory for the cached copy of `url`
    pub fn cache_dir(&self, url: &Url) -> IndexResult<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => ConfigManager::default_cache_dir(url),
        }
    }
}

/// One directory per remote origin, e.g. `https%cpan.metacpan.org`
fn source_dir_name(url: &Url) -> IndexResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| IndexError::invalid_url(url.as_str(), "URL has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{}%{}%{}", url.scheme(), host, port),
        None => format!("{}%{}", url.scheme(), host),
    })
}
