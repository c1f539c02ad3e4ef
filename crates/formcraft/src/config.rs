// File: src/config.rs
// Purpose: Configuration parsing from formcraft.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "formcraft.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Where saved forms live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of the file store (default: ".formcraft")
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    /// Key holding the form list (default: "forms")
    #[serde(default = "default_store_key")]
    pub key: String,
}

/// Preview session settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreviewConfig {
    /// Derived-field passes per change; 0 means derived field count + 1
    #[serde(default)]
    pub max_derived_passes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_store_dir() -> PathBuf {
    PathBuf::from(".formcraft")
}

fn default_store_key() -> String {
    crate::store::FORMS_KEY.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            key: default_store_key(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl PreviewConfig {
    /// Pass budget for `PreviewSession::with_max_passes`
    pub fn max_passes(&self) -> Option<usize> {
        (self.max_derived_passes > 0).then_some(self.max_derived_passes)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./formcraft.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.dir, PathBuf::from(".formcraft"));
        assert_eq!(config.store.key, "forms");
        assert_eq!(config.preview.max_passes(), None);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.store.key, "forms");
    }

    #[test]
    fn test_custom_settings() {
        let toml = r#"
            [store]
            dir = "/tmp/forms"

            [preview]
            max_derived_passes = 10
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.store.dir, PathBuf::from("/tmp/forms"));
        assert_eq!(config.store.key, "forms");
        assert_eq!(config.preview.max_passes(), Some(10));
    }

    #[test]
    fn test_load_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(missing.store.key, "forms");

        let bad_path = dir.path().join("bad.toml");
        let mut file = fs::File::create(&bad_path).unwrap();
        writeln!(file, "[store").unwrap();
        assert!(Config::load(&bad_path).is_err());
    }
}
