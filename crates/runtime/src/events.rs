//! Topic-based session event bus.
//!
//! UI layers observe the session through these events instead of touching
//! the world. Publishing is best-effort: events with no subscriber are dropped.

use tokio::sync::broadcast;

use park_core::{CommandKind, ExpenditureType, Money, NetworkId, Status, Tick};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Results of applied queue entries.
    Actions,
    /// Suspend, resume, clear and discard notifications.
    Queue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ActionExecuted {
        tick: Tick,
        kind: CommandKind,
        network_id: Option<NetworkId>,
        status: Status,
        cost: Money,
        expenditure: ExpenditureType,
    },
    QueueSuspended {
        tick: Tick,
        pending: usize,
    },
    QueueResumed {
        tick: Tick,
        pending: usize,
    },
    QueueCleared {
        tick: Tick,
        dropped: usize,
    },
    EntryDiscarded {
        tick: Tick,
        kind: CommandKind,
        network_id: Option<NetworkId>,
    },
}

impl SessionEvent {
    pub fn topic(&self) -> Topic {
        match self {
            SessionEvent::ActionExecuted { .. } => Topic::Actions,
            SessionEvent::QueueSuspended { .. }
            | SessionEvent::QueueResumed { .. }
            | SessionEvent::QueueCleared { .. }
            | SessionEvent::EntryDiscarded { .. } => Topic::Queue,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    actions: broadcast::Sender<SessionEvent>,
    queue: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a bus whose per-topic channels hold `capacity` unread events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actions: broadcast::channel(capacity).0,
            queue: broadcast::channel(capacity).0,
        }
    }

    fn channel(&self, topic: Topic) -> &broadcast::Sender<SessionEvent> {
        match topic {
            Topic::Actions => &self.actions,
            Topic::Queue => &self.queue,
        }
    }

    pub fn publish(&self, event: SessionEvent) {
        let topic = event.topic();
        if self.channel(topic).send(event).is_err() {
            tracing::trace!(target: "park::session", ?topic, "no subscribers");
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SessionEvent> {
        self.channel(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(100)
    }
}
