//! Application state.

use std::sync::Arc;
use std::time::Duration;
use ticketdesk_core::{DeskConfig, EventPublisher, TicketEvent};
use ticketdesk_store::Store;

use crate::channel::SessionRegistry;
use crate::rate_limit::LoginLimiter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub channel: SessionRegistry,
    /// Where ticket mutations report their changes. Defaults to `channel`.
    pub publisher: Arc<dyn EventPublisher>,
    pub login_limiter: Arc<LoginLimiter>,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &DeskConfig) -> Self {
        let channel = SessionRegistry::new(config.channel_capacity);
        Self {
            store,
            publisher: Arc::new(channel.clone()),
            channel,
            login_limiter: Arc::new(LoginLimiter::new(&config.login_limit)),
            session_ttl: config.session_ttl(),
        }
    }

    /// Replace the event publisher.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Hand a ticket change to the publisher. Never fails the request.
    pub async fn publish(&self, event: TicketEvent) {
        self.publisher.publish(event).await;
    }
}
