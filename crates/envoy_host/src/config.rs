//! Configuration management for the envoy console host.
//!
//! Loads the TOML file, creating it with defaults on first run, and checks
//! it before anything is constructed from it.

use anyhow::Result;
use envoy_system::{EnvoyConfig, MessageTemplates, SpawnZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn default_tick_interval() -> u64 {
    1000 // one countdown second per tick
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub host: HostSettings,
    /// Envoy lifecycle settings, handed to the manager unchanged
    #[serde(default)]
    pub envoys: EnvoyConfig,
    #[serde(default)]
    pub rewards: RewardSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Host runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    /// Wall-clock milliseconds per countdown tick (0 disables the ticker)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Directory holding the persisted envoy snapshot
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            data_dir: default_data_dir(),
        }
    }
}

impl HostSettings {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// Reward pool the console host draws from on every claim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardSettings {
    #[serde(default)]
    pub pool: Vec<String>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HostSettings::default(),
            envoys: EnvoyConfig {
                max_envoys: 3,
                zones: vec![
                    SpawnZone::new("world", 100, 64, 100),
                    SpawnZone::new("world", -250, 70, 40),
                    SpawnZone::new("world", 32, 65, -180),
                    SpawnZone::new("world", -64, 63, -64),
                ],
                messages: MessageTemplates::with_defaults(),
                ..EnvoyConfig::default()
            },
            rewards: RewardSettings {
                pool: vec![
                    "3x Golden Apple".to_string(),
                    "16x Diamond".to_string(),
                    "1x Enchanted Book".to_string(),
                ],
            },
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to that
    /// path and returns it.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if tokio::fs::try_exists(path).await? {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Returns an error string describing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.data_dir.trim().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {VALID_LOG_LEVELS:?}",
                &self.logging.level
            ));
        }

        if self.rewards.pool.iter().any(|reward| reward.trim().is_empty()) {
            return Err("Reward pool entries cannot be empty".to_string());
        }

        self.envoys
            .validate()
            .map_err(|e| format!("Invalid envoy configuration: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envoy_system::TeleportTeardown;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.host.tick_interval_ms, 1000);
        assert_eq!(config.host.data_dir, "data");
        assert_eq!(config.envoys.spawn_interval, 300);
        assert_eq!(config.envoys.zones.len(), 4);
        assert_eq!(config.rewards.pool.len(), 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envoys.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.envoys.max_envoys, 3);
        assert!(path.exists());

        // The written default must load back to the same settings.
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.envoys, config.envoys);
        assert_eq!(reloaded.rewards.pool, config.rewards.pool);
        assert!(reloaded.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[host]
tick_interval_ms = 50
data_dir = "/tmp/envoys"

[envoys]
spawn_interval = 600
despawn_timer = 0
min_envoys = 1
max_envoys = 2
teleport_teardown = "origin_world"

[[envoys.zones]]
world = "world1"
x = 10
y = 64
z = 20

[[envoys.zones]]
world = "nether"
x = -5
y = 40
z = 7

[envoys.messages]
envoy_claimed = "{player} claimed {reward}"

[rewards]
pool = ["1x Diamond"]

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        tokio::fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.host.tick_interval_ms, 50);
        assert_eq!(config.host.data_path(), PathBuf::from("/tmp/envoys"));
        assert_eq!(config.envoys.spawn_interval, 600);
        assert_eq!(config.envoys.despawn_timer, 0);
        assert_eq!(config.envoys.teleport_teardown, TeleportTeardown::OriginWorld);
        assert_eq!(config.envoys.zones[1], SpawnZone::new("nether", -5, 40, 7));
        assert_eq!(
            config.envoys.messages.template("envoy_claimed"),
            "{player} claimed {reward}"
        );
        // Unconfigured keys keep their built-in text.
        assert_eq!(
            config.envoys.messages.template("envoy_spawned"),
            "Envoys have spawned! Go find them!"
        );
        assert_eq!(config.envoys.announce_thresholds.len(), 14);
        assert_eq!(config.rewards.pool, vec!["1x Diamond"]);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_deserialization_with_defaults() {
        let config: AppConfig = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.host.tick_interval_ms, 1000);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json_format);
        assert!(config.envoys.zones.is_empty());
        assert!(config.rewards.pool.is_empty());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("Invalid log level"));
    }

    #[test]
    fn test_validation_empty_data_dir() {
        let mut config = AppConfig::default();
        config.host.data_dir = "  ".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("Data directory cannot be empty"));
    }

    #[test]
    fn test_validation_empty_reward_entry() {
        let mut config = AppConfig::default();
        config.rewards.pool.push(String::new());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_envoy_config() {
        let mut config = AppConfig::default();
        config.envoys.max_envoys = 10;

        let error = config.validate().unwrap_err();
        assert!(error.starts_with("Invalid envoy configuration"));
        assert!(error.contains("10"));
    }

    #[test]
    fn test_empty_pool_is_valid() {
        let mut config = AppConfig::default();
        config.rewards.pool.clear();
        assert!(config.validate().is_ok());
    }
}
