//! HTTP notifier for processes outside the web server.
//!
//! CLI commands change tickets directly in the store; this publisher tells a
//! running server about it so the server can fan the change out to open
//! dashboards.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DEFAULT_WEB_URL;
use crate::event::{EventPublisher, TicketEvent};

/// Notifies the web server of ticket changes via HTTP.
#[derive(Clone)]
pub struct WebNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl WebNotifier {
    /// Create a notifier for the default server URL.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_WEB_URL)
    }

    /// Create a notifier with a custom base URL.
    pub fn with_url(base_url: &str) -> Self {
        debug!(base_url = %base_url, "WebNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn notify_url(&self) -> String {
        format!("{}/internal/notify", self.base_url)
    }
}

impl Default for WebNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for WebNotifier {
    /// POST the outbound envelope to `/internal/notify`.
    async fn publish(&self, event: TicketEvent) {
        let url = self.notify_url();
        let message = event.to_outbound();
        let ticket_id = event.ticket_id().unwrap_or("-");

        debug!(url = %url, kind = event.kind.as_str(), ticket_id = %ticket_id, "Sending ticket notification");

        match self.client.post(&url).json(&message).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(ticket_id = %ticket_id, "Ticket notification sent");
            }
            Ok(response) => {
                warn!(
                    ticket_id = %ticket_id,
                    status_code = %response.status(),
                    "Ticket notification failed with status"
                );
            }
            Err(e) => {
                // Expected when no server is running.
                debug!(
                    ticket_id = %ticket_id,
                    error = %e,
                    url = %url,
                    "Failed to send ticket notification (server may not be running)"
                );
            }
        }
    }
}
