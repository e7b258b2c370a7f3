//! Inbound message delivery for topic subscriptions.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::types::InboundMessage;

/// A stream of messages matching one topic filter.
///
/// Messages are delivered in the order the broker sent them. The stream
/// ends when the bridge shuts down.
pub struct Subscription {
    filter: String,
    receiver: mpsc::Receiver<InboundMessage>,
}

impl Subscription {
    /// Create a subscription fed by the returned sender.
    ///
    /// The bridge uses this for broker subscriptions; tests can use it to
    /// feed a consumer directly.
    pub fn channel(
        filter: impl Into<String>,
        capacity: usize,
    ) -> (mpsc::Sender<InboundMessage>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let subscription = Self {
            filter: filter.into(),
            receiver,
        };
        (sender, subscription)
    }

    /// The topic filter this subscription was registered with.
    pub fn topic_filter(&self) -> &str {
        &self.filter
    }

    /// Wait for the next message. Returns `None` once the bridge is gone.
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        self.receiver.recv().await
    }
}

impl Stream for Subscription {
    type Item = InboundMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("filter", &self.filter)
            .finish()
    }
}

/// A registered filter and the queue feeding its subscription.
#[derive(Debug)]
pub(crate) struct Route {
    pub(crate) id: u64,
    pub(crate) filter: String,
    pub(crate) sender: mpsc::Sender<InboundMessage>,
}

/// Deliver `message` to every route whose filter matches its topic.
///
/// Routes whose subscription was dropped are removed. A full queue drops
/// the message for that route only. Returns the number of deliveries.
pub(crate) fn route_message(routes: &mut Vec<Route>, message: &InboundMessage) -> usize {
    routes.retain(|route| !route.sender.is_closed());

    let mut delivered = 0;
    for route in routes.iter() {
        if !rumqttc::matches(&message.topic, &route.filter) {
            continue;
        }
        match route.sender.try_send(message.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Inbound queue for '{}' is full, dropping message on {}",
                    route.filter, message.topic
                );
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
    delivered
}
