//! Dashboard-side view of the notification channel.
//!
//! A `TicketFeed` is the local ticket list an open dashboard keeps. It
//! subscribes to event kinds and merges delivered frames into the list:
//! creations insert once per id, updates only replace what is already
//! there. Frames of unknown or unsubscribed kinds change nothing.

use serde_json::Value;
use std::collections::HashSet;

use crate::event::{EventKind, TicketEvent};
use crate::wire::{self, Parsed, WireError};

/// What applying a frame did to the local list.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedChange {
    Inserted(Value),
    Replaced(Value),
    Ignored,
}

impl FeedChange {
    /// Toast line to surface for this change.
    pub fn toast(&self) -> Option<String> {
        match self {
            Self::Inserted(ticket) => {
                let kind = ticket
                    .get("complaintType")
                    .and_then(Value::as_str)
                    .unwrap_or("new");
                Some(format!("New Ticket: A new {} ticket has been submitted", kind))
            }
            Self::Replaced(_) => Some("Ticket Updated: Ticket status has been updated".to_string()),
            Self::Ignored => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct TicketFeed {
    tickets: Vec<Value>,
    subscriptions: HashSet<EventKind>,
}

impl TicketFeed {
    /// Start from an initial listing, subscribed to nothing.
    pub fn new(initial: Vec<Value>) -> Self {
        Self {
            tickets: initial,
            subscriptions: HashSet::new(),
        }
    }

    /// Start from an initial listing, subscribed to creations and updates.
    pub fn subscribed(initial: Vec<Value>) -> Self {
        let mut feed = Self::new(initial);
        feed.subscribe(EventKind::Created);
        feed.subscribe(EventKind::Updated);
        feed
    }

    pub fn subscribe(&mut self, kind: EventKind) {
        self.subscriptions.insert(kind);
    }

    pub fn unsubscribe(&mut self, kind: EventKind) {
        self.subscriptions.remove(&kind);
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscriptions.contains(&kind)
    }

    pub fn tickets(&self) -> &[Value] {
        &self.tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tickets
            .iter()
            .position(|t| wire::ticket_id(t) == Some(id))
    }

    /// Parse and apply one frame as received from the channel.
    pub fn apply_frame(&mut self, text: &str) -> Result<FeedChange, WireError> {
        match wire::parse_outbound(text)? {
            Parsed::Event(event) => Ok(self.apply(event)),
            Parsed::Unrecognized(kind) => {
                tracing::debug!(kind = %kind, "Ignoring unrecognized frame");
                Ok(FeedChange::Ignored)
            }
        }
    }

    /// Merge an event into the local list.
    pub fn apply(&mut self, event: TicketEvent) -> FeedChange {
        if !self.is_subscribed(event.kind) {
            return FeedChange::Ignored;
        }
        let Some(id) = event.ticket_id().map(str::to_string) else {
            return FeedChange::Ignored;
        };

        match (event.kind, self.position(&id)) {
            (EventKind::Created, Some(_)) => FeedChange::Ignored,
            (EventKind::Created, None) => {
                self.tickets.push(event.payload.clone());
                FeedChange::Inserted(event.payload)
            }
            (EventKind::Updated, Some(index)) => {
                self.tickets[index] = event.payload.clone();
                FeedChange::Replaced(event.payload)
            }
            (EventKind::Updated, None) => FeedChange::Ignored,
        }
    }
}
