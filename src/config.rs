//! Configuration module
//!
//! Settings are read from a TOML file, by default
//! `~/.config/seed-hasher/config.toml`. Every section and field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{HashVersion, PasswordHasher, DEFAULT_COST};
use crate::error::ConfigError;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SEED_HASHER_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hashing: HashingConfig,
    pub logging: LoggingConfig,
}

/// Parameters for newly produced hashes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// bcrypt cost factor (4..=31)
    pub cost: u32,
    /// Prefix written into new hashes
    pub version: HashVersion,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
            version: HashVersion::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        PasswordHasher::from_config(&self.hashing)
            .map_err(|e| ConfigError::Invalid(format!("hashing.cost: {}", e)))?;

        match self.logging.format.to_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format: expected 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}

/// Default config location under the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seed-hasher")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.hashing.cost, 10);
        assert_eq!(config.hashing.version, HashVersion::TwoB);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
            [hashing]
            cost = 12
            version = "2a"

            [logging]
            level = "debug"
            format = "json"
            "#,
        );

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.hashing.cost, 12);
        assert_eq!(config.hashing.version, HashVersion::TwoA);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let file = write_config("[hashing]\ncost = 6\n");

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.hashing.cost, 6);
        assert_eq!(config.hashing.version, HashVersion::TwoB);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let file = write_config("[hashing]\ncost = 3\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_variant_is_parse_error() {
        let file = write_config("[hashing]\nversion = \"2x\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_bad_log_format_rejected() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_default_path_file_name() {
        let path = default_config_path();
        assert!(path.ends_with("seed-hasher/config.toml"));
    }
}
