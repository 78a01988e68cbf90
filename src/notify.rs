use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Quiz;

/// QuizDeleted
///
/// Deletion payload: subscribers only get the id of the removed quiz.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuizDeleted {
    pub id: Uuid,
}

/// QuizEvent
///
/// Named real-time events emitted on every quiz mutation. Create/update carry
/// the full mutated entity; delete carries only the id.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum QuizEvent {
    #[serde(rename = "quiz.created")]
    Created(Quiz),
    #[serde(rename = "quiz.updated")]
    Updated(Quiz),
    #[serde(rename = "quiz.deleted")]
    Deleted(QuizDeleted),
}

/// QuizNotifier
///
/// Contract for the real-time channel. Publishing is fire-and-forget: a
/// mutation must never fail because nobody is listening.
pub trait QuizNotifier: Send + Sync {
    fn publish(&self, event: QuizEvent);
}

/// BroadcastNotifier
///
/// The in-process implementation, backed by a tokio broadcast channel. Each
/// subscriber gets its own receiver; lagging subscribers drop old events rather
/// than blocking publishers.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<QuizEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// A new receiver for the event stream. Handed to whatever transport
    /// (SSE/WebSocket gateway) fans events out to clients.
    pub fn subscribe(&self) -> broadcast::Receiver<QuizEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl QuizNotifier for BroadcastNotifier {
    fn publish(&self, event: QuizEvent) {
        // Err means no active subscribers; that is fine.
        let _ = self.tx.send(event);
    }
}

/// MockNotifier
///
/// Test sink recording every published event for assertions.
#[derive(Default)]
pub struct MockNotifier {
    pub events: Mutex<Vec<QuizEvent>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<QuizEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl QuizNotifier for MockNotifier {
    fn publish(&self, event: QuizEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// NotifierState
///
/// The concrete type used to share the notifier across the application state.
pub type NotifierState = Arc<dyn QuizNotifier>;
