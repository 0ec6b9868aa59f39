//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Notification enablement
//! - Default reminder lead time for new activities
//! - Document-vault PIN scope (per device install or per account)
//!
//! Configuration is stored at `~/.config/wayfarer/config.toml`.

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::pin::PinScope;

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Offset label preselected when a reminder is switched on.
    #[serde(default = "default_offset")]
    pub default_offset: String,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            default_offset: default_offset(),
        }
    }
}

/// Document-vault configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// "device" (one PIN per installation, the historical behavior) or
    /// "account" (one PIN per logged-in account).
    #[serde(default = "default_scope")]
    pub pin_scope: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            pin_scope: default_scope(),
        }
    }
}

impl VaultConfig {
    /// Resolve the configured scope for the given account.
    ///
    /// # Errors
    /// Returns an error for an unrecognized `pin_scope` value.
    pub fn scope_for(&self, username: &str) -> Result<PinScope> {
        match self.pin_scope.as_str() {
            "device" => Ok(PinScope::Device),
            "account" => Ok(PinScope::Account(username.to_string())),
            other => Err(ConfigError::InvalidValue {
                key: "vault.pin_scope".into(),
                message: format!("expected 'device' or 'account', got '{other}'"),
            }
            .into()),
        }
    }
}

/// Application configuration, persisted as TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub vault: VaultConfig,
}

impl Config {
    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = data_dir()?.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        toml::from_str(&text).map_err(|e| {
            ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Persist the configuration.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let path = data_dir()?.join("config.toml");
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text)?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_offset() -> String {
    "1 hora antes".to_string()
}

fn default_scope() -> String {
    "device".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.notifications.enabled);
        assert_eq!(config.reminders.default_offset, "1 hora antes");
        assert_eq!(config.vault.pin_scope, "device");
    }

    #[test]
    fn scope_resolution() {
        let mut vault = VaultConfig::default();
        assert!(matches!(vault.scope_for("ana").unwrap(), PinScope::Device));

        vault.pin_scope = "account".into();
        match vault.scope_for("ana").unwrap() {
            PinScope::Account(u) => assert_eq!(u, "ana"),
            other => panic!("unexpected scope: {other:?}"),
        }

        vault.pin_scope = "global".into();
        assert!(vault.scope_for("ana").is_err());
    }
}
