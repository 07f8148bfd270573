//! Ticket change events and the publishing capability.
//!
//! Mutation paths hold an `EventPublisher` and hand it a `TicketEvent` after
//! the store write succeeds. The store never sees the publisher and the
//! publisher never reads the store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ticket::model::Ticket;
use crate::wire::{self, OutboundMessage};

/// Kind of ticket change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "ticket-created")]
    Created,
    #[serde(rename = "ticket-updated")]
    Updated,
}

impl EventKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ticket-created" => Some(Self::Created),
            "ticket-updated" => Some(Self::Updated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "ticket-created",
            Self::Updated => "ticket-updated",
        }
    }
}

/// A ticket snapshot taken when a change succeeded. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl TicketEvent {
    pub fn created(ticket: &Ticket) -> Self {
        Self::snapshot(EventKind::Created, ticket)
    }

    pub fn updated(ticket: &Ticket) -> Self {
        Self::snapshot(EventKind::Updated, ticket)
    }

    fn snapshot(kind: EventKind, ticket: &Ticket) -> Self {
        // Ticket holds only strings, enums and vectors of those.
        let payload = serde_json::to_value(ticket).unwrap_or(Value::Null);
        Self { kind, payload }
    }

    /// The id carried by the payload, if any.
    pub fn ticket_id(&self) -> Option<&str> {
        wire::ticket_id(&self.payload)
    }

    /// Enriched envelope as broadcast to clients.
    pub fn to_outbound(&self) -> OutboundMessage {
        OutboundMessage {
            kind: self.kind,
            data: wire::enrich(self.payload.clone()),
        }
    }
}

/// Best-effort sink for ticket events.
///
/// Publishing never fails from the caller's point of view; a ticket
/// mutation's result does not depend on it.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: TicketEvent);
}

/// Publisher that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: TicketEvent) {
        tracing::trace!(kind = event.kind.as_str(), "Dropping ticket event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::model::{ComplaintType, TicketStatus};

    #[test]
    fn test_snapshot_is_enriched_for_broadcast() {
        let ticket = Ticket {
            id: "t1".to_string(),
            student_id: "123456".to_string(),
            complaint_type: ComplaintType::Grade,
            description: "Midterm grade was not recorded".to_string(),
            status: TicketStatus::Open,
            comments: Vec::new(),
            created_at: "2024-05-01T08:00:00+00:00".to_string(),
            updated_at: "2024-05-01T08:00:00+00:00".to_string(),
        };
        let event = TicketEvent::created(&ticket);
        assert_eq!(event.ticket_id(), Some("t1"));

        let outbound = event.to_outbound();
        assert_eq!(outbound.kind, EventKind::Created);
        assert_eq!(outbound.data["id"], "t1");
        assert_eq!(outbound.data["_id"], "t1");
        assert_eq!(outbound.data["complaintType"], "grade");
    }
}
