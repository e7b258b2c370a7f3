//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use mqtt_bridge::{BridgeConfig, BridgeError};

/// Music coordinator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Home Assistant base URL.
    pub ha_url: String,
    /// Home Assistant long-lived access token.
    pub ha_token: String,
    /// Broker connection settings.
    pub bridge: BridgeConfig,
    /// Directory served as the web UI.
    pub ui_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `COORDINATOR_ADDR` | HTTP bind address | `0.0.0.0:8082` |
    /// | `PORT` | Port only, used when `COORDINATOR_ADDR` is unset | |
    /// | `DB_PATH` | SQLite file path | `./music_coordinator.db` |
    /// | `HA_URL` | Home Assistant base URL | `http://localhost:8123` |
    /// | `HA_API_TOKEN` | Home Assistant token | (empty) |
    /// | `MQTT_BROKER` | Broker `host:port` | `localhost:1883` |
    /// | `MQTT_USER` / `MQTT_PASS` | Broker credentials | (anonymous) |
    /// | `MQTT_CLIENT_ID` | MQTT client id | `music-coordinator` |
    /// | `UI_DIR` | Static UI directory | `./ui` |
    ///
    /// Empty values count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let addr_value = match (get("COORDINATOR_ADDR"), get("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => format!("0.0.0.0:{}", port),
            (None, None) => "0.0.0.0:8082".to_string(),
        };
        let addr = addr_value
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_value.clone()))?;

        let db_path = get("DB_PATH").unwrap_or_else(|| "./music_coordinator.db".to_string());
        let database_url = if db_path.starts_with("sqlite:") {
            db_path
        } else {
            format!("sqlite:{}", db_path)
        };

        let ha_url = get("HA_URL")
            .unwrap_or_else(|| "http://localhost:8123".to_string())
            .trim_end_matches('/')
            .to_string();
        let ha_token = get("HA_API_TOKEN").unwrap_or_default();

        let broker = get("MQTT_BROKER").unwrap_or_else(|| "localhost:1883".to_string());
        let client_id = get("MQTT_CLIENT_ID").unwrap_or_else(|| "music-coordinator".to_string());
        let bridge = BridgeConfig::from_address(&broker, client_id)?.with_credentials(
            get("MQTT_USER").unwrap_or_default(),
            get("MQTT_PASS").unwrap_or_default(),
        );

        let ui_dir = PathBuf::from(get("UI_DIR").unwrap_or_else(|| "./ui".to_string()));

        Ok(Self {
            addr,
            database_url,
            ha_url,
            ha_token,
            bridge,
            ui_dir,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidAddr(String),

    #[error("Invalid MQTT settings: {0}")]
    Broker(#[from] BridgeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8082".parse().unwrap());
        assert_eq!(config.database_url, "sqlite:./music_coordinator.db");
        assert_eq!(config.ha_url, "http://localhost:8123");
        assert_eq!(config.ha_token, "");
        assert_eq!(config.bridge.address(), "localhost:1883");
        assert_eq!(config.bridge.client_id, "music-coordinator");
        assert!(config.bridge.username.is_none());
        assert_eq!(config.ui_dir, PathBuf::from("./ui"));
    }

    #[test]
    fn test_port_only() {
        let config = load(&[("PORT", "9000")]).unwrap();
        assert_eq!(config.addr.port(), 9000);

        let config = load(&[("PORT", "9000"), ("COORDINATOR_ADDR", "127.0.0.1:7000")]).unwrap();
        assert_eq!(config.addr, "127.0.0.1:7000".parse().unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DB_PATH", "/data/music.db"),
            ("HA_URL", "http://ha.local:8123/"),
            ("HA_API_TOKEN", "token"),
            ("MQTT_BROKER", "tcp://broker.local:1884"),
            ("MQTT_USER", "coordinator"),
            ("MQTT_PASS", "secret"),
            ("MQTT_CLIENT_ID", "coordinator-2"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite:/data/music.db");
        assert_eq!(config.ha_url, "http://ha.local:8123");
        assert_eq!(config.ha_token, "token");
        assert_eq!(config.bridge.host, "broker.local");
        assert_eq!(config.bridge.port, 1884);
        assert_eq!(config.bridge.client_id, "coordinator-2");
        assert_eq!(config.bridge.username.as_deref(), Some("coordinator"));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = load(&[("DB_PATH", ""), ("MQTT_BROKER", "  ")]).unwrap();
        assert_eq!(config.database_url, "sqlite:./music_coordinator.db");
        assert_eq!(config.bridge.address(), "localhost:1883");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("COORDINATOR_ADDR", "nonsense")]),
            Err(ConfigError::InvalidAddr(_))
        ));
        assert!(matches!(
            load(&[("MQTT_BROKER", "broker:port")]),
            Err(ConfigError::Broker(_))
        ));
    }
}
