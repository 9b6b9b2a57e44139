use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::password::{DEFAULT_HASH_METHOD, HashMethod};

/// Environment variable that overrides `general.database_path`.
pub const DATABASE_URL_ENV: &str = "AUTHN_DATABASE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub security: SecurityConfig,

    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/authn.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// `<algorithm>:<memory_kib>:<iterations>:<parallelism>`, e.g. `argon2id:8192:3:1`.
    /// Changing it makes existing hashes outdated; they are re-hashed on the
    /// next successful login.
    pub password_hash_method: String,

    /// Whether to re-hash outdated passwords on login
    pub auto_migrate_password_hashes: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_hash_method: DEFAULT_HASH_METHOD.to_string(),
            auto_migrate_password_hashes: true,
        }
    }
}

impl SecurityConfig {
    pub fn hash_method(&self) -> Result<HashMethod> {
        self.password_hash_method
            .parse()
            .context("Invalid security.password_hash_method")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Login log entries older than this are removed by `logins prune`
    pub login_entries_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            login_entries_days: 90,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV)
            && !url.trim().is_empty()
        {
            self.general.database_path = url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("byceps-authn").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".byceps-authn").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.security.hash_method()?;

        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database_path, "sqlite:data/authn.db");
        assert_eq!(config.security.password_hash_method, "argon2id:8192:3:1");
        assert!(config.security.auto_migrate_password_hashes);
        assert_eq!(config.retention.login_entries_days, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[security]"));
        assert!(toml_str.contains("[retention]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [security]
            password_hash_method = "argon2id:19456:2:1"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.security.hash_method().unwrap().memory_cost_kib, 19456);

        assert!(config.security.auto_migrate_password_hashes);
        assert_eq!(config.retention.login_entries_days, 90);
    }

    #[test]
    fn test_invalid_hash_method_is_rejected() {
        let mut config = Config::default();
        config.security.password_hash_method = "scrypt:32768:8:1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("byceps-authn-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.retention.login_entries_days = 30;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.retention.login_entries_days, 30);

        std::fs::remove_dir_all(dir).ok();
    }
}
