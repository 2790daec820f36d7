//! Notification sinks.
//!
//! The engine announces successful enrollment transitions through a
//! [`Notifier`] injected at construction. Delivery is best effort: a sink
//! must never fail or block the operation that triggered it.

use dashmap::DashMap;
use tracing::info;

/// Capability for delivering a message to a student.
pub trait Notifier: Send + Sync {
    fn notify(&self, student_id: &str, message: &str);
}

/// Sink that logs each notification and keeps it in a per-student outbox
/// for later inspection (e.g. by the API or by tests).
#[derive(Default)]
pub struct OutboxNotifier {
    messages: DashMap<String, Vec<String>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the pending messages for a student.
    pub fn drain(&self, student_id: &str) -> Vec<String> {
        self.messages
            .remove(student_id)
            .map(|(_, msgs)| msgs)
            .unwrap_or_default()
    }

    pub fn pending_count(&self, student_id: &str) -> usize {
        self.messages.get(student_id).map_or(0, |m| m.len())
    }
}

impl Notifier for OutboxNotifier {
    fn notify(&self, student_id: &str, message: &str) {
        info!("Notifying {}: {}", student_id, message);
        self.messages
            .entry(student_id.to_string())
            .or_default()
            .push(message.to_string());
    }
}

/// Sink that only logs. Useful when no outbox is wanted.
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, student_id: &str, message: &str) {
        info!("Notifying {}: {}", student_id, message);
    }
}
