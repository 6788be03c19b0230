use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::{Event, Notifier};

/// Keeps every event in memory, in publication order.
///
/// Clones share the same buffer, so one handle can be registered while the
/// other is read.
#[derive(Clone, Default)]
pub struct EventJournal {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl Notifier for EventJournal {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
