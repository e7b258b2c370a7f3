//! MQTT broker connection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectionError, Event, EventLoop, Outgoing, Packet, QoS, SubAck,
    SubscribeReasonCode,
};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::publisher::Publisher;
use crate::subscription::{route_message, Route, Subscription};
use crate::types::InboundMessage;

/// Capacity of the request channel between the client handle and the event loop.
const REQUEST_CAPACITY: usize = 64;

/// State shared between the client handle and the driver task.
struct Shared {
    config: BridgeConfig,
    connected: AtomicBool,
    shutdown: AtomicBool,
    routes: Mutex<Vec<Route>>,
    next_route: AtomicU64,
    acks: broadcast::Sender<SubAck>,
    /// Held by `subscribe` until its SUBACK arrives, and by the driver while
    /// it queues resubscriptions.
    subscribe_lock: Mutex<()>,
}

impl Shared {
    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    async fn add_route(&self, filter: &str, sender: tokio::sync::mpsc::Sender<InboundMessage>) -> u64 {
        let id = self.next_route.fetch_add(1, Ordering::SeqCst);
        self.routes.lock().await.push(Route {
            id,
            filter: filter.to_string(),
            sender,
        });
        id
    }

    async fn remove_route(&self, id: u64) {
        self.routes.lock().await.retain(|route| route.id != id);
    }

    /// Re-issue every live subscription after a clean-session reconnect.
    ///
    /// Must run with `subscribe_lock` held so no caller's SUBSCRIBE is queued
    /// in between.
    async fn resubscribe(&self, client: &AsyncClient, tags: &mut ResubscribeAcks) {
        let mut filters: Vec<String> = {
            let routes = self.routes.lock().await;
            routes
                .iter()
                .filter(|route| !route.sender.is_closed())
                .map(|route| route.filter.clone())
                .collect()
        };
        filters.sort();
        filters.dedup();

        for filter in filters {
            // The driver is the only consumer of the request channel, so it
            // must never wait on it.
            match client.try_subscribe(filter.as_str(), QoS::AtMostOnce) {
                Ok(()) => {
                    tags.queued();
                    info!("Resubscribed to {}", filter);
                }
                Err(e) => warn!("Failed to resubscribe to {}: {}", filter, e),
            }
        }
    }
}

/// Tracks the packet ids of the driver's own resubscriptions so their
/// SUBACKs are not handed to a caller waiting in `subscribe`.
///
/// Requests leave the client in order, so the next `untagged` outgoing
/// SUBSCRIBE packets are ours.
#[derive(Debug, Default)]
struct ResubscribeAcks {
    untagged: usize,
    pkids: HashSet<u16>,
}

impl ResubscribeAcks {
    /// A resubscription was queued on the client.
    fn queued(&mut self) {
        self.untagged += 1;
    }

    /// A SUBSCRIBE with `pkid` was written to the broker.
    fn sent(&mut self, pkid: u16) {
        if self.untagged > 0 {
            self.untagged -= 1;
            self.pkids.insert(pkid);
        }
    }

    /// Whether the SUBACK for `pkid` answers a resubscription.
    fn claim(&mut self, pkid: u16) -> bool {
        self.pkids.remove(&pkid)
    }

    /// In-flight SUBSCRIBEs die with the session; their ids get reused.
    fn connection_lost(&mut self) {
        self.pkids.clear();
    }
}

/// A long-lived connection to an MQTT broker.
///
/// Cloning is cheap; all clones share one connection.
#[derive(Clone)]
pub struct MqttBridge {
    client: AsyncClient,
    shared: Arc<Shared>,
    driver: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl MqttBridge {
    /// Connect to the broker.
    ///
    /// Fails if the broker does not accept the connection within the
    /// configured connect timeout. Once connected, a background task keeps
    /// the connection alive and reconnects on loss.
    pub async fn connect(config: BridgeConfig) -> Result<Self, BridgeError> {
        let (client, mut event_loop) = AsyncClient::new(config.mqtt_options(), REQUEST_CAPACITY);
        let address = config.address();
        info!("Connecting to MQTT broker at {}", address);

        match timeout(config.connect_timeout, wait_for_connack(&mut event_loop)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BridgeError::Connection(format!(
                    "no CONNACK from {} within {:?}",
                    address, config.connect_timeout
                )))
            }
        }
        info!("Connected to MQTT broker at {}", address);

        let (acks, _) = broadcast::channel(16);
        let shared = Arc::new(Shared {
            config,
            connected: AtomicBool::new(true),
            shutdown: AtomicBool::new(false),
            routes: Mutex::new(Vec::new()),
            next_route: AtomicU64::new(1),
            acks,
            subscribe_lock: Mutex::new(()),
        });

        let driver = tokio::spawn(drive(event_loop, client.clone(), shared.clone()));

        Ok(Self {
            client,
            shared,
            driver: Arc::new(Mutex::new(Some(driver))),
        })
    }

    /// Check if the broker connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Get the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    /// Subscribe to `filter` at QoS 0.
    ///
    /// Returns once the broker acknowledged the subscription. A rejected or
    /// unacknowledged subscription is an error and leaves nothing registered.
    pub async fn subscribe(&self, filter: &str) -> Result<Subscription, BridgeError> {
        if !rumqttc::valid_filter(filter) {
            return Err(BridgeError::Config(format!(
                "invalid topic filter '{}'",
                filter
            )));
        }

        // One outstanding SUBSCRIBE at a time, so the next SUBACK is ours.
        let _guard = self.shared.subscribe_lock.lock().await;

        let (sender, subscription) =
            Subscription::channel(filter, self.shared.config.queue_capacity);
        let route_id = self.shared.add_route(filter, sender).await;
        let mut acks = self.shared.acks.subscribe();

        if let Err(e) = self.client.subscribe(filter, QoS::AtMostOnce).await {
            self.shared.remove_route(route_id).await;
            return Err(e.into());
        }

        let wait = self.shared.config.subscribe_timeout;
        let ack = match timeout(wait, next_ack(&mut acks)).await {
            Ok(Some(ack)) => ack,
            Ok(None) => {
                self.shared.remove_route(route_id).await;
                return Err(BridgeError::Connection(
                    "bridge stopped while subscribing".to_string(),
                ));
            }
            Err(_) => {
                self.shared.remove_route(route_id).await;
                return Err(BridgeError::SubscribeTimeout {
                    filter: filter.to_string(),
                    timeout: wait,
                });
            }
        };

        if !granted(&ack) {
            self.shared.remove_route(route_id).await;
            return Err(BridgeError::SubscribeRejected(filter.to_string()));
        }

        info!("Subscribed to {}", filter);
        Ok(subscription)
    }

    /// Hand `payload` to the event loop for delivery on `topic` at QoS 0.
    ///
    /// Never waits: if the outbound queue is full (for example while the
    /// connection is down) the publish fails immediately.
    pub fn publish(&self, topic: &str, payload: impl Into<Vec<u8>>) -> Result<(), BridgeError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.into())?;
        debug!("Published to {}", topic);
        Ok(())
    }

    /// Serialize `value` as JSON and publish it.
    pub fn publish_json<T: Serialize>(&self, topic: &str, value: &T) -> Result<(), BridgeError> {
        let payload = serde_json::to_vec(value)?;
        self.publish(topic, payload)
    }

    /// Disconnect from the broker.
    ///
    /// Waits up to `grace` for the connection task to finish, then aborts it.
    /// Subscriptions end once the task is gone.
    pub async fn disconnect(&self, grace: Duration) {
        self.shared.shutdown.store(true, Ordering::SeqCst);

        if let Err(e) = self.client.try_disconnect() {
            debug!("Could not queue DISCONNECT: {}", e);
        }

        let handle = self.driver.lock().await.take();
        if let Some(mut handle) = handle {
            if timeout(grace, &mut handle).await.is_err() {
                warn!("MQTT connection task still running after {:?}, aborting", grace);
                handle.abort();
            }
        }

        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.routes.lock().await.clear();
        info!("Disconnected from MQTT broker");
    }
}

#[async_trait]
impl Publisher for MqttBridge {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        MqttBridge::publish(self, topic, payload)
    }

    fn name(&self) -> &str {
        "mqtt"
    }
}

impl std::fmt::Debug for MqttBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBridge")
            .field("config", &self.shared.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Poll until the broker accepts the connection.
async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), BridgeError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
            Ok(_) => continue,
            Err(e) => return Err(BridgeError::Connection(e.to_string())),
        }
    }
}

/// Wait for the next SUBACK, skipping over any we lagged behind on.
async fn next_ack(acks: &mut broadcast::Receiver<SubAck>) -> Option<SubAck> {
    loop {
        match acks.recv().await {
            Ok(ack) => return Some(ack),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

fn granted(ack: &SubAck) -> bool {
    !ack.return_codes.is_empty()
        && ack
            .return_codes
            .iter()
            .all(|code| !matches!(code, SubscribeReasonCode::Failure))
}

/// Drive the event loop until shutdown.
///
/// Transport errors are never fatal here: the loop logs them, waits the
/// reconnect interval, and polls again, which reconnects.
async fn drive(mut event_loop: EventLoop, client: AsyncClient, shared: Arc<Shared>) {
    let mut tags = ResubscribeAcks::default();
    let mut resubscribe_pending = false;

    loop {
        // A caller mid-subscribe owns the ack stream; resubscribe once it is done.
        if resubscribe_pending {
            if let Ok(_guard) = shared.subscribe_lock.try_lock() {
                shared.resubscribe(&client, &mut tags).await;
                resubscribe_pending = false;
            }
        }

        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                if !shared.connected.swap(true, Ordering::SeqCst) {
                    info!("MQTT connection restored");
                    resubscribe_pending = true;
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = InboundMessage {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                };
                let mut routes = shared.routes.lock().await;
                if route_message(&mut routes, &message) == 0 {
                    debug!("No subscriber took message on {}", message.topic);
                }
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                if tags.claim(ack.pkid) {
                    if !granted(&ack) {
                        warn!("Broker rejected a resubscription (pkid {})", ack.pkid);
                    }
                    continue;
                }
                // No receivers just means nobody is waiting on this ack.
                let _ = shared.acks.send(ack);
            }
            Ok(Event::Outgoing(Outgoing::Subscribe(pkid))) => tags.sent(pkid),
            Ok(Event::Outgoing(Outgoing::Disconnect)) if shared.is_shutting_down() => break,
            Ok(_) => {}
            Err(ConnectionError::RequestsDone) => {
                debug!("All MQTT client handles dropped");
                break;
            }
            Err(e) => {
                if shared.is_shutting_down() {
                    break;
                }
                tags.connection_lost();
                if shared.connected.swap(false, Ordering::SeqCst) {
                    warn!("MQTT connection lost: {}", e);
                } else {
                    debug!("MQTT reconnect failed: {}", e);
                }
                tokio::time::sleep(shared.config.reconnect_interval).await;
            }
        }
    }

    shared.connected.store(false, Ordering::SeqCst);
    debug!("MQTT connection task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suback(codes: Vec<SubscribeReasonCode>) -> SubAck {
        SubAck::new(1, codes)
    }

    #[test]
    fn test_granted() {
        assert!(granted(&suback(vec![SubscribeReasonCode::Success(
            QoS::AtMostOnce
        )])));
        assert!(!granted(&suback(vec![SubscribeReasonCode::Failure])));
        assert!(!granted(&suback(vec![])));
    }

    #[test]
    fn test_resubscribe_acks_are_claimed() {
        let mut tags = ResubscribeAcks::default();
        tags.queued();
        tags.queued();

        tags.sent(4);
        tags.sent(5);
        // A caller's SUBSCRIBE queued after ours is not tagged.
        tags.sent(6);

        assert!(tags.claim(5));
        assert!(!tags.claim(6));
        assert!(tags.claim(4));
        assert!(!tags.claim(4));
    }

    #[test]
    fn test_resubscribe_tags_cleared_on_loss() {
        let mut tags = ResubscribeAcks::default();
        tags.queued();
        tags.sent(1);
        tags.connection_lost();

        // The id is free again and belongs to whoever sends it next.
        assert!(!tags.claim(1));

        // Queued but unsent resubscriptions survive the loss.
        tags.queued();
        tags.connection_lost();
        tags.sent(2);
        assert!(tags.claim(2));
    }

    #[tokio::test]
    async fn test_next_ack_skips_lag() {
        let (sender, mut receiver) = broadcast::channel(1);
        sender.send(suback(vec![SubscribeReasonCode::Failure])).unwrap();
        sender
            .send(suback(vec![SubscribeReasonCode::Success(QoS::AtMostOnce)]))
            .unwrap();

        let ack = next_ack(&mut receiver).await.unwrap();
        assert!(granted(&ack));

        drop(sender);
        assert!(next_ack(&mut receiver).await.is_none());
    }
}
