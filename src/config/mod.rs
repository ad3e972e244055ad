//! Configuration management for ThreatLens

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheConfig, CostModel, ResolverConfig, TtlTable};
use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Default log level (`error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Data store location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file; defaults to the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Query result cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Budget in mebibytes of cost units
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    #[serde(default)]
    pub cost_model: CostModel,
}

/// Miss-path settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Deadline for a single data store fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_max_size_mb() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_size_mb: default_max_size_mb(),
            cost_model: CostModel::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            cache: CacheSettings::default(),
            resolver: ResolverSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".threatlens").join("config.yaml"))
    }

    /// Load configuration from `path`, or from the default path.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load_at(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that would make startup fail later.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_size_mb == 0 {
            return Err(ConfigError::InvalidCacheBudget(0).into());
        }
        if self.resolver.fetch_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("resolver.fetch_timeout_ms must be greater than zero".into()).into());
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)).into());
        }
        Ok(())
    }

    /// Database path, falling back to `<data dir>/threatlens/intel.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.database.path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or(ConfigError::Invalid(
            "Could not determine data directory".to_string(),
        ))?;
        Ok(data_dir.join("threatlens").join("intel.db"))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::from_megabytes(self.cache.max_size_mb)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            ttls: TtlTable::default(),
            cost_model: self.cache.cost_model,
            fetch_timeout: self.resolver.fetch_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_size_mb, 100);
        assert_eq!(config.cache.cost_model, CostModel::Uniform);
        assert!(config.resolver.fetch_timeout_ms.is_none());
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache.max_size_mb, 100);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "database:\n  path: /tmp/intel.db\ncache:\n  max_size_mb: 8\n  cost_model: bytes\nresolver:\n  fetch_timeout_ms: 250\nlog_level: debug\n",
        );

        let config = Config::load_at(Some(&path)).unwrap();
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/intel.db"));
        assert_eq!(config.cache_config().max_cost, 8 * 1024 * 1024);

        let resolver = config.resolver_config();
        assert_eq!(resolver.cost_model, CostModel::Bytes);
        assert_eq!(resolver.fetch_timeout, Some(Duration::from_millis(250)));
        assert_eq!(resolver.ttls, TtlTable::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_at(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound)));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "cache:\n  max_size_mb: 0\n");

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidCacheBudget(0))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "cache: [unterminated");

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let config = Config {
            log_level: "loud".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
