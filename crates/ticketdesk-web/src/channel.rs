//! Notification channel: the set of open dashboard sessions and the
//! fan-out of ticket events to them.
//!
//! Each registered session owns a bounded queue of serialized frames that
//! its connection task drains. Publishing never waits on a peer: a frame is
//! offered to every queue except the origin's, and a full or closed queue
//! only costs that session the frame. Membership changes take the write
//! lock, so a fan-out pass always sees a whole membership list.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use ticketdesk_core::wire::OutboundMessage;
use ticketdesk_core::{EventPublisher, TicketEvent};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Identifies one open connection.
pub type SessionId = u64;

/// A serialized outbound message, shared by every recipient.
pub type Frame = Arc<str>;

/// Handle returned by `register`.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub frames: mpsc::Receiver<Frame>,
}

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

struct Registry {
    sessions: RwLock<HashMap<SessionId, mpsc::Sender<Frame>>>,
    next_id: AtomicU64,
    capacity: usize,
}

/// Cloneable handle to the set of open sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Registry>,
}

impl SessionRegistry {
    /// `capacity` is the number of frames queued per session before
    /// further frames to it are dropped.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Registry {
                sessions: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Add a newly opened session to the broadcast set.
    pub fn register(&self) -> Session {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inner.capacity);
        let live = {
            let mut sessions = self.inner.sessions.write();
            sessions.insert(id, tx);
            sessions.len()
        };
        debug!(session_id = id, live, "Session registered");
        Session { id, frames: rx }
    }

    /// Remove a session. Removing an absent session is a no-op; the return
    /// value says whether anything was removed.
    pub fn unregister(&self, id: SessionId) -> bool {
        let (removed, live) = {
            let mut sessions = self.inner.sessions.write();
            let removed = sessions.remove(&id).is_some();
            (removed, sessions.len())
        };
        if removed {
            debug!(session_id = id, live, "Session unregistered");
        }
        removed
    }

    /// Frames each session may have queued.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.inner.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `message` to every session except `origin`.
    pub fn publish(&self, message: &OutboundMessage, origin: Option<SessionId>) -> Delivery {
        let frame: Frame = match message.to_json() {
            Ok(json) => json.into(),
            Err(e) => {
                warn!(error = %e, "Could not serialize outbound message");
                return Delivery::default();
            }
        };

        let mut delivery = Delivery::default();
        let sessions = self.inner.sessions.read();
        for (&id, tx) in sessions.iter() {
            if Some(id) == origin {
                continue;
            }
            match tx.try_send(Arc::clone(&frame)) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    delivery.failed += 1;
                    warn!(
                        session_id = id,
                        kind = message.kind.as_str(),
                        channel_capacity = self.inner.capacity,
                        "Session queue full, frame dropped (raise channel_capacity if this persists)"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    delivery.failed += 1;
                    debug!(session_id = id, "Session closing, frame dropped");
                }
            }
        }
        drop(sessions);

        debug!(
            kind = message.kind.as_str(),
            origin = ?origin,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "Fan-out complete"
        );
        delivery
    }

    /// Enrich and deliver a ticket event.
    pub fn publish_event(&self, event: &TicketEvent, origin: Option<SessionId>) -> Delivery {
        self.publish(&event.to_outbound(), origin)
    }
}

#[async_trait]
impl EventPublisher for SessionRegistry {
    /// Events from request handlers have no origin session and reach everyone.
    async fn publish(&self, event: TicketEvent) {
        self.publish_event(&event, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use ticketdesk_core::EventKind;

    fn created(id: &str) -> OutboundMessage {
        OutboundMessage {
            kind: EventKind::Created,
            data: json!({"id": id, "status": "open", "complaintType": "grade"}),
        }
    }

    fn updated(id: &str) -> OutboundMessage {
        OutboundMessage {
            kind: EventKind::Updated,
            data: json!({"id": id, "status": "resolved"}),
        }
    }

    fn frame_json(frame: Frame) -> Value {
        serde_json::from_str(&frame).unwrap()
    }

    #[test]
    fn test_fan_out_excludes_origin() {
        let registry = SessionRegistry::new(8);
        let mut a = registry.register();
        let mut b = registry.register();
        let mut c = registry.register();

        let delivery = registry.publish(&created("t1"), Some(a.id));
        assert_eq!(delivery, Delivery { delivered: 2, failed: 0 });

        for session in [&mut b, &mut c] {
            let value = frame_json(session.frames.try_recv().unwrap());
            assert_eq!(value["type"], "ticket-created");
            assert_eq!(value["data"]["id"], "t1");
            assert!(session.frames.try_recv().is_err(), "delivered exactly once");
        }
        assert!(a.frames.try_recv().is_err());
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let registry = SessionRegistry::new(8);
        let a = registry.register();
        let mut b = registry.register();
        let mut c = registry.register();

        assert!(registry.unregister(b.id));
        let delivery = registry.publish(&updated("t1"), Some(a.id));
        assert_eq!(delivery.delivered, 1);

        assert!(b.frames.try_recv().is_err());
        let value = frame_json(c.frames.try_recv().unwrap());
        assert_eq!(value["type"], "ticket-updated");
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = SessionRegistry::new(8);
        let a = registry.register();
        let mut b = registry.register();

        assert!(registry.unregister(a.id));
        assert!(!registry.unregister(a.id));
        assert!(!registry.unregister(9_999));
        assert_eq!(registry.len(), 1);

        registry.publish(&created("t2"), None);
        assert!(b.frames.try_recv().is_ok());
    }

    #[test]
    fn test_failed_session_does_not_block_others() {
        let registry = SessionRegistry::new(1);
        let closed = registry.register();
        let mut slow = registry.register();
        let mut healthy = registry.register();
        drop(closed.frames);

        registry.publish(&created("t1"), None);
        healthy.frames.try_recv().unwrap();

        // `slow` never drained its first frame, so its queue is full.
        let delivery = registry.publish(&created("t2"), None);
        assert_eq!(delivery, Delivery { delivered: 1, failed: 2 });

        let value = frame_json(healthy.frames.try_recv().unwrap());
        assert_eq!(value["data"]["id"], "t2");
        let value = frame_json(slow.frames.try_recv().unwrap());
        assert_eq!(value["data"]["id"], "t1");
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        assert_eq!(SessionRegistry::new(0).capacity(), 1);
        assert_eq!(SessionRegistry::new(100).capacity(), 100);

        let registry = SessionRegistry::new(0);
        let mut session = registry.register();
        assert_eq!(registry.publish(&created("t1"), None).delivered, 1);
        assert_eq!(registry.publish(&created("t2"), None).failed, 1);
        assert!(session.frames.try_recv().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_membership_churn_during_fan_out() {
        let registry = SessionRegistry::new(1024);
        let mut stable = registry.register();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let session = registry.register();
                    tokio::task::yield_now().await;
                    assert!(registry.unregister(session.id));
                }
            }));
        }
        let publisher = {
            let registry = registry.clone();
            tokio::spawn(async move {
                let mut deliveries = Vec::new();
                for i in 0..200 {
                    deliveries.push(registry.publish(&created(&format!("t{i}")), None));
                    tokio::task::yield_now().await;
                }
                deliveries
            })
        };

        for task in tasks {
            task.await.unwrap();
        }
        let deliveries = publisher.await.unwrap();

        // The stable session sees every frame, and no pass counts more
        // sessions than could have been registered at once.
        for delivery in &deliveries {
            assert!(delivery.delivered >= 1);
            assert!(delivery.delivered + delivery.failed <= 5);
        }
        for i in 0..200 {
            let value = frame_json(stable.frames.try_recv().unwrap());
            assert_eq!(value["data"]["id"], format!("t{i}"));
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_per_session_order_follows_publish_order() {
        let registry = SessionRegistry::new(16);
        let mut session = registry.register();
        for i in 0..5 {
            registry.publish(&created(&format!("t{i}")), None);
        }
        for i in 0..5 {
            let value = frame_json(session.frames.try_recv().unwrap());
            assert_eq!(value["data"]["id"], format!("t{i}"));
        }
    }

    #[test]
    fn test_late_joiner_gets_nothing_from_before() {
        let registry = SessionRegistry::new(8);
        registry.publish(&created("t1"), None);
        let mut late = registry.register();
        assert!(late.frames.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publisher_reaches_every_session() {
        use ticketdesk_core::ticket::model::{ComplaintType, Ticket, TicketStatus};

        let registry = SessionRegistry::new(8);
        let mut a = registry.register();
        let publisher: Arc<dyn EventPublisher> = Arc::new(registry.clone());

        let ticket = Ticket {
            id: "t7".to_string(),
            student_id: "123456".to_string(),
            complaint_type: ComplaintType::Facility,
            description: "Leaking roof in the gym".to_string(),
            status: TicketStatus::Open,
            comments: Vec::new(),
            created_at: "2024-05-01T08:00:00+00:00".to_string(),
            updated_at: "2024-05-01T08:00:00+00:00".to_string(),
        };
        publisher.publish(TicketEvent::created(&ticket)).await;

        let value = frame_json(a.frames.recv().await.unwrap());
        assert_eq!(value["data"]["id"], "t7");
        assert_eq!(value["data"]["_id"], "t7");
    }
}
