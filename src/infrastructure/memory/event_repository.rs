//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// An in-memory `EventRepository` backed by the shared `MemoryStore`. `create`'s duplicate check is
// the in-memory stand-in for the Postgres unique constraint on `event_id` (I5).
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{models::{OrderEvent, RepositoryError}, repositories::EventRepository};

pub struct MemoryEventRepository {
    store: Arc<MemoryStore>,
}

impl MemoryEventRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn get(&self, event_id: Uuid) -> Result<Option<OrderEvent>, RepositoryError> {
        Ok(self.store.events.lock().unwrap().get(&event_id).cloned())
    }

    async fn create(&self, event: &OrderEvent) -> Result<(), RepositoryError> {
        let mut events = self.store.events.lock().unwrap();
        if events.contains_key(&event.event_id) {
            return Err(RepositoryError::conflict("duplicate event_id"));
        }
        events.insert(event.event_id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &OrderEvent) -> Result<(), RepositoryError> {
        self.store
            .events
            .lock()
            .unwrap()
            .insert(event.event_id, event.clone());
        Ok(())
    }

    async fn delete(&self, event_id: Uuid) -> Result<(), RepositoryError> {
        self.store.events.lock().unwrap().remove(&event_id);
        Ok(())
    }
}
