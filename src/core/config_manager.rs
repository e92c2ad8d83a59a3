// src/core/config_manager.rs
//! Unified configuration management - one place that reads config.yaml and the environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_log;
use crate::ports::RetryPolicy;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub directive: String,
}

/// Delays and retry settings for the simulated network operations.
/// Fields missing from the file keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub upload_step_delay_ms: u64,
    pub submit_delay_ms: u64,
    pub fetch_delay_ms: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LoggingSection {
    path: Option<PathBuf>,
    directive: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EnvironmentSection {
    storage: StorageSection,
    logging: LoggingSection,
    simulation: Option<SimulationConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            upload_step_delay_ms: 200,
            submit_delay_ms: 1500,
            fetch_delay_ms: 0,
            retry_attempts: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl ConfigManager {
    /// Load configuration for the current environment from `config.yaml` in the
    /// working directory, falling back to built-in defaults. `JOBMATCH_STORAGE_PATH`
    /// and `JOBMATCH_LOG_PATH` override the file.
    pub fn load() -> Result<Self> {
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        let mut config = Self::load_from(&base_dir.join(CONFIG_FILE), &base_dir, &Self::get_environment())?;

        if let Ok(path) = std::env::var("JOBMATCH_STORAGE_PATH") {
            config.storage.path = Self::resolve_path(&base_dir, Path::new(&path));
        }
        if let Ok(path) = std::env::var("JOBMATCH_LOG_PATH") {
            config.logging.path = Self::resolve_path(&base_dir, Path::new(&path));
        }

        Ok(config)
    }

    /// Load the `environment` section of an explicit file; relative paths
    /// resolve against `base_dir`.
    pub fn load_from(config_path: &Path, base_dir: &Path, environment: &str) -> Result<Self> {
        app_log!(info, "Loading configuration for environment: {}", environment);

        let section = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let file: ConfigFile = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            match environment {
                "production" => file.production,
                _ => file.local,
            }
        } else {
            app_log!(
                info,
                "{} not found, using default configuration",
                config_path.display()
            );
            EnvironmentSection::default()
        };

        let mut config = Self::with_defaults(environment, base_dir);
        if let Some(path) = section.storage.path {
            config.storage.path = path;
        }
        if let Some(path) = section.logging.path {
            config.logging.path = path;
        }
        if let Some(directive) = section.logging.directive {
            config.logging.directive = directive;
        }
        if let Some(simulation) = section.simulation {
            config.simulation = simulation;
        }

        config.storage.path = Self::resolve_path(base_dir, &config.storage.path);
        config.logging.path = Self::resolve_path(base_dir, &config.logging.path);

        Ok(config)
    }

    /// Defaults for an environment, rooted at `base_dir`.
    pub fn with_defaults(environment: &str, base_dir: &Path) -> Self {
        let data_dir = if environment == "production" {
            PathBuf::from("/app/data")
        } else {
            base_dir.join(".jobmatch")
        };

        Self {
            environment: environment.to_string(),
            storage: StorageConfig {
                path: data_dir.join("storage.json"),
            },
            logging: LoggingConfig {
                path: data_dir.join("jobmatch.log"),
                directive: "info".to_string(),
            },
            simulation: SimulationConfig::default(),
        }
    }

    fn get_environment() -> String {
        std::env::var("JOBMATCH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

impl SimulationConfig {
    pub fn upload_step_delay(&self) -> Duration {
        Duration::from_millis(self.upload_step_delay_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_backoff_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::load_from(&dir.path().join("none.yaml"), dir.path(), "local").unwrap();

        assert!(config.storage.path.is_absolute());
        assert_eq!(config.simulation.upload_step_delay_ms, 200);
        assert_eq!(config.logging.directive, "info");
    }

    #[test]
    fn test_local_section_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
local:
  simulation:
    upload_step_delay_ms: 0
    submit_delay_ms: 0
    fetch_delay_ms: 0
    retry_attempts: 5
    retry_backoff_ms: 1
production:
  storage:
    path: /var/lib/jobmatch/storage.json
"#,
        )
        .unwrap();

        let config = ConfigManager::load_from(&path, dir.path(), "local").unwrap();
        assert_eq!(config.simulation.retry_attempts, 5);
        assert_eq!(config.simulation.upload_step_delay_ms, 0);
        assert!(config.storage.path.starts_with(dir.path()));

        let config = ConfigManager::load_from(&path, dir.path(), "production").unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/jobmatch/storage.json"));
        assert_eq!(config.simulation.retry_attempts, 2);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
local:
  logging:
    directive: debug
  simulation:
    retry_attempts: 7
"#,
        )
        .unwrap();

        let config = ConfigManager::load_from(&path, dir.path(), "local").unwrap();
        assert_eq!(config.simulation.retry_attempts, 7);
        assert_eq!(config.simulation.submit_delay_ms, 1500);
        assert_eq!(config.simulation.retry_backoff_ms, 250);
        assert_eq!(config.logging.directive, "debug");
        assert_eq!(config.logging.path, dir.path().join(".jobmatch/jobmatch.log"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "local: [not, a, map").unwrap();

        assert!(ConfigManager::load_from(&path, dir.path(), "local").is_err());
    }
}
