use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use castellum_game::events::GameEvent;

/// Delivers committed game events to whoever listens (websockets, notifications).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: Vec<GameEvent>);
}

/// In-process fan-out over a `tokio::sync::broadcast` channel.
/// Slow subscribers lose the oldest events rather than blocking the worker.
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<GameEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, events: Vec<GameEvent>) {
        for event in events {
            let name = event.name();
            let village_id = event.village_id();
            // no subscribers is fine
            if self.sender.send(event).is_err() {
                debug!(event = name, village_id, "No subscribers for event");
            }
        }
    }
}
