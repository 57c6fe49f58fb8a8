use crate::event::StreamEvent;
use dashmap::DashMap;
use std::sync::Arc;

/// Callback invoked on the stream reader task for every matching named event.
pub type Handler = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

/// Unique identifier for a registered handler (registry-generated).
///
/// Returned by `add_event_handler` and required for removal; callbacks have
/// no usable identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(String);

impl HandlerId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-connection table of named-event handlers.
///
/// Shared between the registry (add/remove) and the connection's reader task
/// (dispatch), so it lives behind its own concurrent map rather than the
/// registry lock. Handlers are deliberately not deduplicated; registering
/// the same callback twice means it runs twice.
pub(crate) struct HandlerTable {
    entries: DashMap<String, Vec<(HandlerId, Handler)>>,
}

impl HandlerTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a handler for an event name and return its id.
    pub(crate) fn add(&self, event_name: &str, handler: Handler) -> HandlerId {
        let handler_id = HandlerId::new();
        self.entries
            .entry(event_name.to_string())
            .or_default()
            .push((handler_id.clone(), handler));
        handler_id
    }

    /// Remove a handler; returns false if the id was not registered under
    /// that event name.
    pub(crate) fn remove(&self, event_name: &str, handler_id: &HandlerId) -> bool {
        let Some(mut entry) = self.entries.get_mut(event_name) else {
            return false;
        };

        let before = entry.len();
        entry.retain(|(id, _)| id != handler_id);
        let removed = entry.len() != before;

        // Clean up empty event entries
        if entry.is_empty() {
            drop(entry); // Release lock before removal
            self.entries.remove(event_name);
        }

        removed
    }

    /// Invoke every handler registered for the event's name, in registration
    /// order.
    pub(crate) fn dispatch(&self, event: &StreamEvent) {
        // Clone the handler list out of the map before invoking, so a
        // callback may add or remove handlers without deadlocking on the
        // shard lock.
        let handlers: Vec<Handler> = match self.entries.get(event.event_type.as_str()) {
            Some(entry) => entry.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return,
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Total number of registered handlers across all event names.
    pub(crate) fn handler_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(name: &str) -> StreamEvent {
        StreamEvent {
            event_type: name.to_string(),
            data: "{}".to_string(),
        }
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_invokes_matching_handlers_once() {
        let table = HandlerTable::new();
        let hits = Arc::new(AtomicUsize::new(0));
        table.add("update", counting_handler(Arc::clone(&hits)));

        table.dispatch(&event("update"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        table.dispatch(&event("update"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dispatch_ignores_other_event_names() {
        let table = HandlerTable::new();
        let hits = Arc::new(AtomicUsize::new(0));
        table.add("update", counting_handler(Arc::clone(&hits)));

        table.dispatch(&event("delete"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicate_handlers_are_not_deduplicated() {
        let table = HandlerTable::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(Arc::clone(&hits));
        table.add("update", Arc::clone(&handler));
        table.add("update", handler);

        table.dispatch(&event("update"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(table.handler_count(), 2);
    }

    #[test]
    fn test_removed_handler_is_never_invoked_again() {
        let table = HandlerTable::new();
        let kept = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicUsize::new(0));
        table.add("update", counting_handler(Arc::clone(&kept)));
        let handler_id = table.add("update", counting_handler(Arc::clone(&dropped)));

        table.dispatch(&event("update"));
        assert!(table.remove("update", &handler_id));
        table.dispatch(&event("update"));

        assert_eq!(kept.load(Ordering::SeqCst), 2);
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_unknown_handler_reports_false() {
        let table = HandlerTable::new();
        let handler_id = table.add("update", Arc::new(|_| {}));

        // Wrong event name, then wrong id
        assert!(!table.remove("delete", &handler_id));
        assert!(table.remove("update", &handler_id));
        assert!(!table.remove("update", &handler_id));
        assert_eq!(table.handler_count(), 0);
    }

    #[test]
    fn test_handler_may_mutate_table_during_dispatch() {
        let table = Arc::new(HandlerTable::new());
        let reentrant = Arc::clone(&table);
        table.add(
            "update",
            Arc::new(move |_event| {
                reentrant.add("other", Arc::new(|_| {}));
            }),
        );

        table.dispatch(&event("update"));
        assert_eq!(table.handler_count(), 2);
    }
}
