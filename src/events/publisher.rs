use crate::models::Task;
use serde_json::Value;
use tokio::sync::broadcast;

/// Fire-and-forget publisher for task lifecycle events.
///
/// Backed by a broadcast channel: publishing succeeds whether or not anyone
/// is subscribed, and ordering across event types is not guaranteed. A thin
/// adapter at the host boundary translates these into whatever messaging the
/// application uses.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<LifecycleEvent>,
}

/// A published lifecycle event carrying the task, the actor that caused the
/// transition, and a free-form context map
#[derive(Debug, Clone)]
pub struct LifecycleEvent {
    pub name: String,
    pub task: Task,
    pub actor: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a lifecycle event. A send with no subscribers is success;
    /// events exist for observers, not for control flow.
    pub fn publish(
        &self,
        event_name: impl Into<String>,
        task: &Task,
        actor: impl Into<String>,
        context: Value,
    ) {
        let event = LifecycleEvent {
            name: event_name.into(),
            task: task.clone(),
            actor: actor.into(),
            context,
            published_at: chrono::Utc::now(),
        };
        // SendError only means nobody is listening right now
        let _ = self.sender.send(event);
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1024)
    }
}
