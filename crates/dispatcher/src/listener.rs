//! Bridge-driven entry point: play requests arriving over MQTT.

use std::sync::Arc;

use futures::StreamExt;
use mqtt_bridge::{InboundMessage, PlayRequest, Publisher, Subscription};
use tracing::{debug, error, info, warn};

use crate::error::DispatchError;
use crate::pipeline::{Dispatched, Dispatcher};
use crate::targets::PlayTargets;

/// Result of handling a single inbound message.
#[derive(Debug)]
pub enum ListenResult {
    /// A playback command was published.
    Dispatched(Dispatched),
    /// The payload was not a play request.
    Skipped { reason: String },
    /// The dispatch failed.
    Error(DispatchError),
}

/// Counters for one listener run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub dispatched: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl ListenerStats {
    fn record(&mut self, result: &ListenResult) {
        match result {
            ListenResult::Dispatched(_) => self.dispatched += 1,
            ListenResult::Skipped { .. } => self.skipped += 1,
            ListenResult::Error(_) => self.failed += 1,
        }
    }
}

/// Feeds a subscription's messages through the dispatcher, one at a time.
///
/// There is nobody to reply to, so failures are logged and the listener
/// moves on to the next message.
pub struct PlayListener<T: PlayTargets, P: Publisher> {
    subscription: Subscription,
    dispatcher: Arc<Dispatcher<T, P>>,
}

impl<T: PlayTargets, P: Publisher> PlayListener<T, P> {
    /// Create a new listener.
    pub fn new(subscription: Subscription, dispatcher: Arc<Dispatcher<T, P>>) -> Self {
        Self {
            subscription,
            dispatcher,
        }
    }

    /// Get a reference to the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<T, P> {
        &self.dispatcher
    }

    /// Decode and dispatch a single message.
    pub async fn handle_message(&self, message: &InboundMessage) -> ListenResult {
        handle(&self.dispatcher, message).await
    }

    /// Run until the subscription closes.
    pub async fn run(self) -> ListenerStats {
        let Self {
            mut subscription,
            dispatcher,
        } = self;
        info!("Listening for play requests on {}", subscription.topic_filter());

        let mut stats = ListenerStats::default();
        while let Some(message) = subscription.next().await {
            let result = handle(&dispatcher, &message).await;
            stats.record(&result);
        }

        warn!("Play request subscription closed");
        stats
    }

    /// Run until the subscription closes or `shutdown_signal` completes.
    ///
    /// A message already being dispatched finishes before shutdown is seen.
    pub async fn run_with_shutdown<S>(self, shutdown_signal: S) -> ListenerStats
    where
        S: std::future::Future<Output = ()> + Send,
    {
        let Self {
            mut subscription,
            dispatcher,
        } = self;
        info!(
            "Listening for play requests on {} (graceful shutdown enabled)",
            subscription.topic_filter()
        );

        let mut stats = ListenerStats::default();
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping play listener");
                    return stats;
                }

                message = subscription.next() => {
                    match message {
                        Some(message) => {
                            let result = handle(&dispatcher, &message).await;
                            if let ListenResult::Dispatched(ref dispatched) = result {
                                debug!(
                                    intent = %dispatched.intent,
                                    location = %dispatched.location,
                                    "Play request handled"
                                );
                            }
                            stats.record(&result);
                        }
                        None => {
                            warn!("Play request subscription closed");
                            return stats;
                        }
                    }
                }
            }
        }
    }
}

/// Decode and dispatch one message, logging any failure.
async fn handle<T: PlayTargets, P: Publisher>(
    dispatcher: &Dispatcher<T, P>,
    message: &InboundMessage,
) -> ListenResult {
    let request: PlayRequest = match message.decode() {
        Ok(request) => request,
        Err(e) => {
            warn!("Ignoring malformed play request on {}: {}", message.topic, e);
            return ListenResult::Skipped {
                reason: e.to_string(),
            };
        }
    };

    match dispatcher.dispatch(&request).await {
        Ok(dispatched) => ListenResult::Dispatched(dispatched),
        Err(e) => {
            error!(
                intent = %request.intent,
                location = %request.location,
                "Play request failed: {}",
                e
            );
            ListenResult::Error(e)
        }
    }
}
