use std::panic::{catch_unwind, AssertUnwindSafe};

use log::warn;

use crate::types::{GestureEvent, GestureKind};

/// What a registration listens for: one exact gesture kind, or everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureFilter {
    Kind(GestureKind),
    Any,
}

pub type ObserverId = u64;

struct Registration {
    id: ObserverId,
    filter: GestureFilter,
    callback: Box<dyn FnMut(&GestureEvent)>,
}

/// Registration table and synchronous fan-out. Observers receive immutable
/// records; a failing observer is isolated and logged, never propagated.
pub struct GestureDispatcher {
    next_id: ObserverId,
    entries: Vec<Registration>,
}

impl Default for GestureDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDispatcher {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        filter: GestureFilter,
        callback: impl FnMut(&GestureEvent) + 'static,
    ) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Registration {
            id,
            filter,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Invokes exact-kind observers in registration order, then wildcard
    /// observers in registration order.
    pub fn dispatch(&mut self, event: &GestureEvent) {
        let kind = event.kind();
        for pass in [GestureFilter::Kind(kind), GestureFilter::Any] {
            for entry in self.entries.iter_mut().filter(|entry| entry.filter == pass) {
                let callback = &mut entry.callback;
                if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                    warn!("gesture: observer_panic id={} kind={:?}", entry.id, kind);
                }
            }
        }
    }
}
