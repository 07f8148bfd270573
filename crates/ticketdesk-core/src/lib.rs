//! Ticketdesk Core Library
//!
//! Domain models and business logic for the student complaint desk:
//! tickets, accounts, sessions, and the contracts of the real-time
//! notification channel.

pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod notifier;
pub mod ticket;
pub mod user;
pub mod wire;

pub use config::DeskConfig;
pub use error::{DeskError, DeskResult};
pub use event::{EventKind, EventPublisher, NoopPublisher, TicketEvent};
pub use feed::{FeedChange, TicketFeed};
pub use notifier::WebNotifier;
