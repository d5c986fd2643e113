use serde::Deserialize;
use std::path::Path;

use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// IP address to bind the API server to (default: "127.0.0.1").
    /// Set to "0.0.0.0" to listen on all interfaces.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

fn default_port() -> u16 {
    8765
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
        }
    }
}

fn default_data_path() -> String {
    "data/data.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    /// Whether desktop notifications may be presented at all. When false the
    /// permission provider reports "denied" and dispatch becomes a no-op.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Minimum minutes between two notification evaluations for the same
    /// trigger window.
    #[serde(default = "default_suppression_window_mins")]
    pub suppression_window_mins: i64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            tick_interval_secs: default_tick_interval_secs(),
            suppression_window_mins: default_suppression_window_mins(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_suppression_window_mins() -> i64 {
    2
}

impl AppConfig {
    /// Load config.toml, falling back to defaults when the file is absent.
    /// The daemon is fully functional with zero configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.store.data_path, "data/data.json");
        assert!(config.notifications.enabled);
        assert_eq!(config.notifications.tick_interval_secs, 60);
        assert_eq!(config.notifications.suppression_window_mins, 2);
    }

    #[test]
    fn test_partial_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [notifications]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert!(!config.notifications.enabled);
        assert_eq!(config.notifications.tick_interval_secs, 60);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("definitely-missing.toml")).unwrap();
        assert_eq!(config.server.port, 8765);
    }
}
