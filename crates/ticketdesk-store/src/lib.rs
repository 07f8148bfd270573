//! Ticketdesk Store
//!
//! Document persistence for tickets, user accounts and login sessions.
//! Redis is the production backend; an in-memory backend serves tests and
//! `serve --memory`.

pub mod client;
pub mod memory;
pub mod queries;
pub mod repository;

pub use client::{init_pool, RedisPool, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use queries::sessions::SessionRow;
pub use queries::tickets::{CommentRow, TicketRow};
pub use queries::users::UserRow;
pub use queries::RedisStore;
pub use repository::{SessionRepository, Store, TicketRepository, UserRepository};
