//! Application configuration.
//!
//! Settings come from a YAML file whose path is taken from
//! `TIMEKEEPER_CONFIG` (default `timekeeper.yaml`). Every field is optional;
//! a missing or unreadable file falls back to the defaults.
//!
//! ```yaml
//! data_directory: /var/lib/timekeeper
//! storage: csv
//! bind_address: 0.0.0.0:3000
//! allowed_origin: http://localhost:8080
//! seed_demo_users: true
//! default_vacation_days: 22
//! max_break_minutes: 480
//! notifications:
//!   admin_email: rrhh@empresa.com
//!   enabled: true
//!   delivery_log_capacity: 100
//! ```
//!
//! `TIMEKEEPER_DATA_DIR` and `TIMEKEEPER_BIND` override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::duration::MAX_BREAK_MINUTES;
use crate::storage::CsvConnection;

pub const CONFIG_PATH_ENV: &str = "TIMEKEEPER_CONFIG";
pub const DATA_DIR_ENV: &str = "TIMEKEEPER_DATA_DIR";
pub const BIND_ENV: &str = "TIMEKEEPER_BIND";
pub const DEFAULT_CONFIG_FILE: &str = "timekeeper.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// One CSV file per collection under `data_directory`
    Csv,
    /// Nothing survives a restart
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub admin_email: String,
    pub enabled: bool,
    pub delivery_log_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@empresa.com".to_string(),
            enabled: true,
            delivery_log_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_directory: PathBuf,
    pub storage: StorageKind,
    pub bind_address: String,
    pub allowed_origin: String,
    pub seed_demo_users: bool,
    pub default_vacation_days: u32,
    pub max_break_minutes: u32,
    pub notifications: NotificationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: CsvConnection::default_data_directory()
                .unwrap_or_else(|_| PathBuf::from("timekeeper-data")),
            storage: StorageKind::Csv,
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
            seed_demo_users: true,
            default_vacation_days: 22,
            max_break_minutes: MAX_BREAK_MINUTES,
            notifications: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config YAML: {:?}", config_path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(config_path: &Path) -> Self {
        match Self::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config from {:?}: {:#}", config_path, e);
                log::info!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Resolve the config file from the environment, then apply the
    /// environment overrides
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::load_or_default(Path::new(&path));
        config.apply_overrides(
            std::env::var(DATA_DIR_ENV).ok(),
            std::env::var(BIND_ENV).ok(),
        );
        config
    }

    pub fn apply_overrides(&mut self, data_directory: Option<String>, bind_address: Option<String>) {
        if let Some(dir) = data_directory.filter(|dir| !dir.trim().is_empty()) {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(bind) = bind_address.filter(|bind| !bind.trim().is_empty()) {
            self.bind_address = bind;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_break_minutes > 24 * 60 {
            anyhow::bail!("max_break_minutes cannot exceed a full day");
        }
        if self.notifications.enabled && !self.notifications.admin_email.contains('@') {
            anyhow::bail!(
                "notifications.admin_email '{}' is not an email address",
                self.notifications.admin_email
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("timekeeper.yaml");
        fs::write(
            &path,
            "storage: memory\ndefault_vacation_days: 25\nnotifications:\n  enabled: false\n",
        )?;

        let config = AppConfig::load(&path)?;
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.default_vacation_days, 25);
        assert!(!config.notifications.enabled);
        assert_eq!(config.notifications.admin_email, "admin@empresa.com");
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.max_break_minutes, 480);
        Ok(())
    }

    #[test]
    fn test_missing_or_invalid_file_falls_back_to_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let missing = AppConfig::load_or_default(&temp_dir.path().join("absent.yaml"));
        assert_eq!(missing, AppConfig::default());

        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "notifications:\n  admin_email: nobody\n")?;
        assert!(AppConfig::load(&path).is_err());
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
        Ok(())
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("/tmp/tk".to_string()), Some("  ".to_string()));
        assert_eq!(config.data_directory, PathBuf::from("/tmp/tk"));
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }
}
