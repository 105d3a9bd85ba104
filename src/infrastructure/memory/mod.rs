//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// In-memory repository implementations used by unit tests in place of Postgres. `MemoryStore` is
// the shared backing for events so that `MemoryOrderRepository::get` can join an order's header to
// its full event history the way a real `SELECT ... JOIN order_events` would, never
// from whatever the header repository last cached from `save`.
//--------------------------------------------------------------------------------------------------

pub mod event_repository;
pub mod order_repository;

pub use event_repository::MemoryEventRepository;
pub use order_repository::MemoryOrderRepository;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use uuid::Uuid;

use crate::domain::models::OrderEvent;

#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<HashMap<Uuid, OrderEvent>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// Convenience constructor for a consistent pair of repositories sharing one backing store.
pub fn new_repositories() -> (Arc<MemoryOrderRepository>, Arc<MemoryEventRepository>) {
    let store = MemoryStore::new();
    (
        Arc::new(MemoryOrderRepository::new(store.clone())),
        Arc::new(MemoryEventRepository::new(store)),
    )
}
