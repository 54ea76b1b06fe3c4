//! Broadcast message templates with `{placeholder}` substitution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Colour code prepended to every broadcast.
pub const GREEN: &str = "§a";

/// Rendered when a key has neither a configured nor a built-in template.
pub const MISSING_MESSAGE: &str = "Message not found";

pub const SPAWN_WARNING: &str = "envoy_spawn_warning";
pub const SPAWNED: &str = "envoy_spawned";
pub const MARKER: &str = "envoy_marker";
pub const CLAIMED: &str = "envoy_claimed";

fn builtin(key: &str) -> Option<&'static str> {
    match key {
        SPAWN_WARNING => Some("Envoys will spawn in {time}!"),
        SPAWNED => Some("Envoys have spawned! Go find them!"),
        MARKER => Some("§l§bEnvoy\nTap me!\n\nDespawning in §e{despawn}§f!"),
        // Claims are silent unless a template is configured.
        CLAIMED => Some(""),
        _ => None,
    }
}

/// Keyed message templates.
///
/// Configured entries override the built-in defaults key by key, so a
/// partial `[envoys.messages]` table keeps the remaining defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplates(HashMap<String, String>);

impl MessageTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates with every built-in key filled in, used when writing a
    /// default configuration file.
    pub fn with_defaults() -> Self {
        let mut templates = HashMap::new();
        for key in [SPAWN_WARNING, SPAWNED, MARKER, CLAIMED] {
            if let Some(template) = builtin(key) {
                templates.insert(key.to_string(), template.to_string());
            }
        }
        Self(templates)
    }

    pub fn set(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.0.insert(key.into(), template.into());
    }

    /// Raw template for `key`, before substitution.
    pub fn template(&self, key: &str) -> &str {
        self.0
            .get(key)
            .map(String::as_str)
            .or_else(|| builtin(key))
            .unwrap_or(MISSING_MESSAGE)
    }

    /// Renders `key`, replacing every `{name}` with its value.
    pub fn format(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        let mut message = self.template(key).to_string();
        for (placeholder, value) in replacements {
            message = message.replace(&format!("{{{placeholder}}}"), value);
        }
        message
    }
}
