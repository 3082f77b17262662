use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source of a configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Server URL (e.g., "http://localhost:8000" or "https://api.example.com")
    pub server_url: Option<String>,
    /// Bearer token issued at device registration
    pub device_token: Option<String>,
    /// Flush the outbox automatically after writes (default: false)
    #[serde(default)]
    pub auto_sync: bool,
}

impl SyncConfig {
    /// Returns true if sync is configured (has both server_url and device_token)
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.device_token.is_some()
    }
}

/// Application configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the local collection files
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut config_file = None;
        let mut sync = SyncConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Read(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::Parse(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("COM_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("COM_SERVER_URL") {
            sync.server_url = Some(url);
        }
        if let Ok(token) = std::env::var("COM_DEVICE_TOKEN") {
            sync.device_token = Some(token);
        }
        if let Ok(auto) = std::env::var("COM_AUTO_SYNC") {
            sync.auto_sync = matches!(auto.as_str(), "1" | "true" | "yes");
        }

        Ok(Self {
            data_dir,
            config_file,
            sync,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/countonme/
    /// - macOS: ~/Library/Application Support/countonme/
    /// - Windows: %APPDATA%/countonme/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("countonme")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/countonme/
    /// - macOS: ~/Library/Application Support/countonme/
    /// - Windows: %APPDATA%/countonme/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("countonme")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, #[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert!(config.sync.server_url.is_none());
        assert!(!config.sync.is_configured());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/path/data").unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  server_url: http://localhost:8000").unwrap();
        writeln!(file, "  device_token: secret").unwrap();
        writeln!(file, "  auto_sync: true").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/path/data"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(
            config.sync.server_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert!(config.sync.auto_sync);
        assert!(config.sync.is_configured());
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: data").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  server_url: http://fromfile").unwrap();

        std::env::set_var("COM_SERVER_URL", "http://fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.sync.server_url.as_deref(), Some("http://fromenv"));

        std::env::remove_var("COM_SERVER_URL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
