//! Configuration types for mqtt-bridge.

use std::time::Duration;

use rumqttc::MqttOptions;

use crate::error::BridgeError;

/// Default MQTT port.
pub const DEFAULT_PORT: u16 = 1883;

/// Configuration for connecting to the MQTT broker.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Broker host name or IP.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Username, if the broker requires authentication.
    pub username: Option<String>,
    /// Password paired with `username`.
    pub password: Option<String>,
    /// Interval between keep-alive pings.
    pub keep_alive: Duration,
    /// Fixed wait between reconnect attempts.
    pub reconnect_interval: Duration,
    /// How long startup waits for the first CONNACK.
    pub connect_timeout: Duration,
    /// How long `subscribe` waits for a SUBACK.
    pub subscribe_timeout: Duration,
    /// Per-subscription inbound queue size.
    pub queue_capacity: usize,
}

impl BridgeConfig {
    /// Create a configuration for `host:port` with default policies.
    pub fn new(host: impl Into<String>, port: u16, client_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
            username: None,
            password: None,
            keep_alive: Duration::from_secs(60),
            reconnect_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            subscribe_timeout: Duration::from_secs(10),
            queue_capacity: 64,
        }
    }

    /// Parse a broker address such as `mqtt.local:1883`, `tcp://host:1883`
    /// or just `host` (port defaults to 1883).
    pub fn from_address(address: &str, client_id: impl Into<String>) -> Result<Self, BridgeError> {
        let trimmed = address.trim();
        let without_scheme = trimmed
            .strip_prefix("mqtt://")
            .or_else(|| trimmed.strip_prefix("tcp://"))
            .unwrap_or(trimmed);

        let (host, port) = match without_scheme.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| BridgeError::Config(format!("invalid broker port in '{}'", address)))?;
                (host, port)
            }
            None => (without_scheme, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(BridgeError::Config(format!(
                "missing broker host in '{}'",
                address
            )));
        }

        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(BridgeError::Config("client id cannot be empty".to_string()));
        }

        Ok(Self::new(host, port, client_id))
    }

    /// Set credentials. An empty username leaves the connection anonymous.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        if username.is_empty() {
            self.username = None;
            self.password = None;
        } else {
            self.username = Some(username);
            self.password = Some(password.into());
        }
        self
    }

    /// Broker address as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the rumqttc options for this configuration.
    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        if let Some(username) = &self.username {
            options.set_credentials(username, self.password.as_deref().unwrap_or_default());
        }
        options
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT, "music-coordinator")
    }
}
