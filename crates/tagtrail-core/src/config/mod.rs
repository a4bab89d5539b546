//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Tagtrail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseSection,
    pub recommendation: RecommendationConfig,
}

/// Database location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// Path to the SQLite database file; `None` uses the default location
    pub path: Option<PathBuf>,
}

/// Tuning knobs for the recommendation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// How many problems one `recommend` call returns by default
    pub default_count: usize,
    /// Minimum number of solvers a problem needs to be recommendable
    pub min_solver_count: i64,
    /// Failed-attempt budget is `requested_count * retry_factor`
    pub retry_factor: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseSection { path: None },
            recommendation: RecommendationConfig::default(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_count: 3,
            min_solver_count: 100,
            retry_factor: 10,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("TAGTRAIL_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("tagtrail")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Resolve the database path, honoring the configured override
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        Ok(Self::config_dir()?.join("tagtrail.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.recommendation.default_count, 3);
        assert_eq!(config.recommendation.min_solver_count, 100);
        assert_eq!(config.recommendation.retry_factor, 10);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(
            parsed.recommendation.default_count,
            config.recommendation.default_count
        );
        assert_eq!(
            parsed.recommendation.min_solver_count,
            config.recommendation.min_solver_count
        );
    }

    #[test]
    fn test_database_path_override() {
        let config = Config {
            database: DatabaseSection {
                path: Some(PathBuf::from("/tmp/custom.db")),
            },
            ..Default::default()
        };
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/custom.db")
        );
    }
}
