//! Envoy configuration and its startup validation.
//!
//! Every option has a serde default, but zones have no sensible default: an
//! empty `[envoys]` table fails validation until at least `max_envoys` zones
//! are configured. Validation runs once, when the lifecycle manager is
//! constructed; nothing is re-checked per tick.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::messages::MessageTemplates;
use crate::types::SpawnZone;

/// Seconds-before-spawn at which a warning is broadcast.
pub const DEFAULT_ANNOUNCE_THRESHOLDS: [u64; 14] =
    [3600, 1800, 900, 600, 300, 60, 30, 15, 10, 5, 4, 3, 2, 1];

fn default_spawn_interval() -> u64 {
    300
}

fn default_despawn_timer() -> u64 {
    120
}

fn default_min_envoys() -> usize {
    1
}

fn default_max_envoys() -> usize {
    10
}

fn default_announce_thresholds() -> Vec<u64> {
    DEFAULT_ANNOUNCE_THRESHOLDS.to_vec()
}

fn default_restore_on_start() -> bool {
    true
}

/// Which markers a cross-world teleport tears down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportTeardown {
    /// Destroy every active marker, in every world.
    #[default]
    Global,
    /// Destroy only markers in the world the entity left.
    OriginWorld,
}

/// Envoy spawning, lifetime and messaging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvoyConfig {
    /// Seconds between spawn waves (countdown reset value)
    #[serde(default = "default_spawn_interval")]
    pub spawn_interval: u64,
    /// Maximum lifetime of an envoy in seconds, 0 disables despawning
    #[serde(default = "default_despawn_timer")]
    pub despawn_timer: u64,
    /// Minimum envoys per wave
    #[serde(default = "default_min_envoys")]
    pub min_envoys: usize,
    /// Maximum envoys per wave
    #[serde(default = "default_max_envoys")]
    pub max_envoys: usize,
    /// Countdown values (seconds) at which a warning is broadcast
    #[serde(default = "default_announce_thresholds")]
    pub announce_thresholds: Vec<u64>,
    /// Reload persisted envoys when the manager is enabled
    #[serde(default = "default_restore_on_start")]
    pub restore_on_start: bool,
    /// Marker teardown scope on cross-world teleports
    #[serde(default)]
    pub teleport_teardown: TeleportTeardown,
    /// Candidate spawn positions
    #[serde(default)]
    pub zones: Vec<SpawnZone>,
    /// Broadcast templates
    #[serde(default)]
    pub messages: MessageTemplates,
}

impl Default for EnvoyConfig {
    fn default() -> Self {
        Self {
            spawn_interval: default_spawn_interval(),
            despawn_timer: default_despawn_timer(),
            min_envoys: default_min_envoys(),
            max_envoys: default_max_envoys(),
            announce_thresholds: default_announce_thresholds(),
            restore_on_start: default_restore_on_start(),
            teleport_teardown: TeleportTeardown::default(),
            zones: Vec::new(),
            messages: MessageTemplates::default(),
        }
    }
}

impl EnvoyConfig {
    /// Checks the configuration for values that would make the countdown or
    /// the spawn planner misbehave at runtime.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.spawn_interval == 0 {
            return Err(ConfigError::ZeroSpawnInterval);
        }

        if self.min_envoys > self.max_envoys {
            return Err(ConfigError::InvalidCountRange {
                min: self.min_envoys,
                max: self.max_envoys,
            });
        }

        if self.max_envoys > self.zones.len() {
            return Err(ConfigError::NotEnoughZones {
                max: self.max_envoys,
                available: self.zones.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.zones.len());
        for (index, zone) in self.zones.iter().enumerate() {
            if zone.world.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyWorldName(index));
            }
            if !seen.insert(zone.key()) {
                return Err(ConfigError::DuplicateZone(zone.key()));
            }
        }

        for pair in self.announce_thresholds.windows(2) {
            if pair[1] >= pair[0] {
                return Err(ConfigError::ThresholdsNotDescending {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        if self.announce_thresholds.contains(&0) {
            return Err(ConfigError::ZeroThreshold);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(count: i32) -> Vec<SpawnZone> {
        (0..count).map(|i| SpawnZone::new("world", i * 10, 64, 0)).collect()
    }

    fn valid_config() -> EnvoyConfig {
        EnvoyConfig {
            zones: zones(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_envoy_config_default() {
        let config = EnvoyConfig::default();
        assert_eq!(config.spawn_interval, 300);
        assert_eq!(config.despawn_timer, 120);
        assert_eq!(config.min_envoys, 1);
        assert_eq!(config.max_envoys, 10);
        assert_eq!(config.announce_thresholds.first(), Some(&3600));
        assert_eq!(config.announce_thresholds.last(), Some(&1));
        assert!(config.restore_on_start);
        assert_eq!(config.teleport_teardown, TeleportTeardown::Global);
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_interval() {
        let mut config = valid_config();
        config.spawn_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSpawnInterval)));
    }

    #[test]
    fn test_validation_inverted_range() {
        let mut config = valid_config();
        config.min_envoys = 5;
        config.max_envoys = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCountRange { min: 5, max: 3 })
        ));
    }

    #[test]
    fn test_validation_not_enough_zones() {
        let mut config = valid_config();
        config.zones = zones(4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotEnoughZones { max: 10, available: 4 })
        ));
    }

    #[test]
    fn test_validation_duplicate_zone() {
        let mut config = valid_config();
        config.zones.push(SpawnZone::new("world", 0, 64, 0));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateZone(_))));
    }

    #[test]
    fn test_validation_same_position_in_other_world_is_fine() {
        let mut config = valid_config();
        config.zones.push(SpawnZone::new("nether", 0, 64, 0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_thresholds() {
        let mut config = valid_config();
        config.announce_thresholds = vec![60, 30, 30];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdsNotDescending { previous: 30, next: 30 })
        ));

        config.announce_thresholds = vec![60, 0];
        assert!(matches!(config.validate(), Err(ConfigError::ZeroThreshold)));

        config.announce_thresholds = vec![];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_world_name() {
        let mut config = valid_config();
        config.zones[3] = SpawnZone::new(" ", 1, 2, 3);
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWorldName(3))));
    }

    #[test]
    fn test_serde_deserialization_with_defaults() {
        let json = serde_json::json!({
            "spawn_interval": 60,
            "zones": [{ "world": "world1", "x": 10, "y": 64, "z": 20 }],
            "max_envoys": 1,
            "teleport_teardown": "origin_world",
            "messages": { "envoy_spawned": "Go!" }
        });
        let config: EnvoyConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.spawn_interval, 60);
        assert_eq!(config.despawn_timer, 120);
        assert_eq!(config.zones[0].world.as_str(), "world1");
        assert_eq!(config.teleport_teardown, TeleportTeardown::OriginWorld);
        assert_eq!(config.messages.format("envoy_spawned", &[]), "Go!");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_table_needs_zones() {
        let config: EnvoyConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(config.zones.is_empty());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotEnoughZones {
                max: 10,
                available: 0
            })
        ));
    }
}
