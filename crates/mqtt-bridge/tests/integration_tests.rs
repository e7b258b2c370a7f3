//! Integration tests for mqtt-bridge.
//!
//! Most tests need no broker. The round-trip tests need one on
//! `MQTT_BROKER` (default `localhost:1883`).
//!
//! Run ignored tests (require broker):
//!   cargo test --test integration_tests -- --ignored

use std::env;
use std::time::Duration;

use mqtt_bridge::{
    BridgeConfig, BridgeError, MqttBridge, PlayCommand, PlayRequest, Publisher, COMMAND_TOPIC,
    DEFAULT_PORT,
};

/// Helper to get the broker address from environment.
fn broker_address() -> String {
    let _ = dotenvy::dotenv();
    env::var("MQTT_BROKER").unwrap_or_else(|_| "localhost:1883".to_string())
}

// ============================================================================
// Unit tests (no broker required)
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BridgeConfig::default();
        assert_eq!(config.address(), "localhost:1883");
        assert_eq!(config.client_id, "music-coordinator");
        assert_eq!(config.keep_alive, Duration::from_secs(60));
        assert_eq!(config.reconnect_interval, Duration::from_secs(5));
        assert_eq!(config.queue_capacity, 64);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_from_address() {
        let config = BridgeConfig::from_address("mqtt.local:1884", "coordinator").unwrap();
        assert_eq!(config.host, "mqtt.local");
        assert_eq!(config.port, 1884);
        assert_eq!(config.client_id, "coordinator");
    }

    #[test]
    fn test_from_address_with_scheme() {
        let config = BridgeConfig::from_address("tcp://10.0.0.5:1883", "c").unwrap();
        assert_eq!(config.host, "10.0.0.5");

        let config = BridgeConfig::from_address("mqtt://broker", "c").unwrap();
        assert_eq!(config.host, "broker");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_from_address_invalid() {
        assert!(matches!(
            BridgeConfig::from_address("broker:notaport", "c"),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_address(":1883", "c"),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_address("broker:1883", ""),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn test_credentials() {
        let config = BridgeConfig::default().with_credentials("user", "secret");
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("secret"));

        let config = BridgeConfig::default().with_credentials("", "secret");
        assert!(config.username.is_none());
        assert!(config.password.is_none());
    }

    #[test]
    fn test_mqtt_options() {
        let config = BridgeConfig::new("broker", 1885, "c").with_credentials("u", "p");
        let options = config.mqtt_options();
        assert_eq!(options.broker_address(), ("broker".to_string(), 1885));
        assert_eq!(options.client_id(), "c");
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
        assert_eq!(
            options.credentials(),
            Some(("u".to_string(), "p".to_string()))
        );
    }
}

mod connection_tests {
    use super::*;

    /// Connecting to a port nobody listens on fails startup.
    #[tokio::test]
    async fn test_connect_failure() {
        let mut config = BridgeConfig::new("127.0.0.1", 59999, "bridge-test");
        config.connect_timeout = Duration::from_secs(2);
        let result = MqttBridge::connect(config).await;
        match result {
            Err(BridgeError::Connection(_)) => {}
            other => panic!("Unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    #[ignore = "requires running broker"]
    async fn test_connect_and_disconnect() {
        let config = BridgeConfig::from_address(&broker_address(), "bridge-test-connect").unwrap();
        let bridge = MqttBridge::connect(config).await.unwrap();
        assert!(bridge.is_connected());
        assert_eq!(Publisher::name(&bridge), "mqtt");

        bridge.disconnect(Duration::from_millis(250)).await;
        assert!(!bridge.is_connected());
    }

    #[tokio::test]
    #[ignore = "requires running broker"]
    async fn test_publish_subscribe_round_trip() {
        let config = BridgeConfig::from_address(&broker_address(), "bridge-test-rt").unwrap();
        let bridge = MqttBridge::connect(config).await.unwrap();

        let topic = "music-coordinator/test/round-trip";
        let mut subscription = bridge.subscribe(topic).await.unwrap();
        assert_eq!(subscription.topic_filter(), topic);

        bridge
            .publish_json(topic, &PlayRequest::new("christmas", "garage"))
            .unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), subscription.recv())
            .await
            .expect("no message within 5s")
            .expect("subscription closed");
        let request: PlayRequest = message.decode().unwrap();
        assert_eq!(request, PlayRequest::new("christmas", "garage"));

        bridge.disconnect(Duration::from_millis(250)).await;
        assert!(subscription.recv().await.is_none());
    }

    #[tokio::test]
    #[ignore = "requires running broker"]
    async fn test_publish_command_through_trait() {
        let config = BridgeConfig::from_address(&broker_address(), "bridge-test-cmd").unwrap();
        let bridge = MqttBridge::connect(config).await.unwrap();
        let mut subscription = bridge.subscribe(COMMAND_TOPIC).await.unwrap();

        let command = PlayCommand::playlist("media_player.garage", "Carols");
        let publisher: &dyn Publisher = &bridge;
        publisher
            .publish(COMMAND_TOPIC, serde_json::to_vec(&command).unwrap())
            .await
            .unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), subscription.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.decode::<PlayCommand>().unwrap(), command);

        bridge.disconnect(Duration::from_millis(250)).await;
    }

    #[tokio::test]
    #[ignore = "requires running broker"]
    async fn test_invalid_filter() {
        let config = BridgeConfig::from_address(&broker_address(), "bridge-test-filter").unwrap();
        let bridge = MqttBridge::connect(config).await.unwrap();
        assert!(matches!(
            bridge.subscribe("a/#/b").await,
            Err(BridgeError::Config(_))
        ));
        bridge.disconnect(Duration::from_millis(250)).await;
    }
}
