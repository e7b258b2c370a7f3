//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use dispatcher::Dispatcher;
use mqtt_bridge::Publisher;

use crate::discovery::HomeAssistantClient;

/// The publisher the service dispatches through.
pub type SharedPublisher = Arc<dyn Publisher>;

/// Dispatcher shared by the HTTP handlers and the MQTT listener.
pub type PlayDispatcher = Dispatcher<Database, SharedPublisher>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Play request pipeline.
    pub dispatcher: Arc<PlayDispatcher>,
    /// Media player discovery.
    pub home_assistant: HomeAssistantClient,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        dispatcher: Arc<PlayDispatcher>,
        home_assistant: HomeAssistantClient,
    ) -> Self {
        Self {
            db,
            dispatcher,
            home_assistant,
        }
    }
}
