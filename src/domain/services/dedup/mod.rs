//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The in-flight event set: a concurrent set of `event_id`s currently being processed
// by some ingestion call. It collapses concurrent duplicate submissions of the same event before
// the persistence layer's unique constraint ever sees them. It has its own lock, independent of
// the engine's critical section.
//
// | Component       | Description                                              |
// |-----------------|-----------------------------------------------------------|
// | InFlightEvents  | Concurrent set of event ids currently mid-processing      |
//--------------------------------------------------------------------------------------------------

use std::{collections::HashSet, sync::Mutex};

use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InFlightEvents {
    events: Mutex<HashSet<Uuid>>,
}

impl InFlightEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `event_id` was newly added (i.e. it was not already in flight).
    pub fn add(&self, event_id: Uuid) -> bool {
        self.events.lock().unwrap().insert(event_id)
    }

    pub fn contains(&self, event_id: Uuid) -> bool {
        self.events.lock().unwrap().contains(&event_id)
    }

    pub fn remove(&self, event_id: Uuid) {
        self.events.lock().unwrap().remove(&event_id);
    }
}

/// RAII guard that removes the event id from the in-flight set on drop, so the engine's
/// dedupe gate is released on every exit path, including early returns and panics.
pub struct InFlightGuard<'a> {
    set: &'a InFlightEvents,
    event_id: Uuid,
}

impl<'a> InFlightGuard<'a> {
    pub fn new(set: &'a InFlightEvents, event_id: Uuid) -> Self {
        Self { set, event_id }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(self.event_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_first_claim_only() {
        let set = InFlightEvents::new();
        let id = Uuid::new_v4();
        assert!(set.add(id));
        assert!(!set.add(id));
        assert!(set.contains(id));
    }

    #[test]
    fn guard_removes_on_drop() {
        let set = InFlightEvents::new();
        let id = Uuid::new_v4();
        set.add(id);
        {
            let _guard = InFlightGuard::new(&set, id);
            assert!(set.contains(id));
        }
        assert!(!set.contains(id));
    }
}
