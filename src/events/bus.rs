//! Event bus for broadcasting board changes to WebSocket clients.

use super::types::{BoardEvent, EventEmitter};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 1024;

/// Distributes `BoardEvent`s via `tokio::sync::broadcast`.
///
/// Fire-and-forget: emitting never blocks, never panics. With no
/// subscribers connected, events are silently dropped. Subscribers receive
/// events in emission order; a slow subscriber that lags past the channel
/// capacity loses the oldest events and must resync.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events (one receiver per WebSocket client).
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, event: BoardEvent) {
        let channel = event.channel();
        match self.sender.send(event) {
            Ok(n) => {
                debug!(channel = %channel, subscribers = n, "board event emitted");
            }
            Err(_) => {
                // No subscribers — expected and fine.
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChangeAction, EntityKind};
    use uuid::Uuid;

    #[test]
    fn test_emit_without_subscriber_no_panic() {
        let bus = EventBus::default();
        bus.emit(BoardEvent::created(
            EntityKind::Task,
            serde_json::json!({"title": "Test"}),
        ));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_emit_with_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(BoardEvent::created(
            EntityKind::Task,
            serde_json::json!({"title": "Task"}),
        ));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.entity, EntityKind::Task);
        assert_eq!(event.action, ChangeAction::Created);
        assert_eq!(event.payload["title"], "Task");
    }

    #[test]
    fn test_multi_subscribers_all_receive() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let mut rx3 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 3);

        let id = Uuid::new_v4();
        bus.emit(BoardEvent::deleted(EntityKind::Epic, id));

        for rx in [&mut rx1, &mut rx2, &mut rx3] {
            let event = rx.try_recv().unwrap();
            assert_eq!(event.deleted_id(), Some(id));
        }
    }

    #[test]
    fn test_events_received_in_emission_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        for i in 0..5 {
            bus.emit(BoardEvent::updated(
                EntityKind::Task,
                serde_json::json!({"seq": i}),
            ));
        }
        for i in 0..5 {
            let event = rx.try_recv().unwrap();
            assert_eq!(event.payload["seq"], i);
        }
    }

    #[test]
    fn test_dropped_subscriber_does_not_affect_others() {
        let bus = EventBus::default();
        let rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(BoardEvent::tasks_bulk_updated());
        let event = rx2.try_recv().unwrap();
        assert_eq!(event.action, ChangeAction::BulkUpdated);
    }

    #[test]
    fn test_clone_shares_channel() {
        let bus = EventBus::default();
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.emit(BoardEvent::created(
            EntityKind::Project,
            serde_json::json!({"title": "p"}),
        ));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.entity, EntityKind::Project);
    }
}
