//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// An in-memory `OrderRepository`. Headers are stored locally; `get` joins them to the shared
// `MemoryStore`'s events so a non-advancing event persisted via `MemoryEventRepository` is still
// visible on the order's next lookup, matching Postgres's `order_events` join.
//--------------------------------------------------------------------------------------------------

use std::{collections::HashMap, sync::{Arc, Mutex}};

use async_trait::async_trait;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{
    models::{FinalityFilter, Order, OrderFilter, RepositoryError, SortBy, SortOrder},
    repositories::OrderRepository,
};

pub struct MemoryOrderRepository {
    store: Arc<MemoryStore>,
    headers: Mutex<HashMap<Uuid, Order>>,
}

impl MemoryOrderRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            headers: Mutex::new(HashMap::new()),
        }
    }

    fn events_for(&self, order_id: Uuid) -> Vec<crate::domain::models::OrderEvent> {
        let events = self.store.events.lock().unwrap();
        let mut matching: Vec<_> = events
            .values()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        matching
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let header = self.headers.lock().unwrap().get(&order_id).cloned();
        Ok(header.map(|mut order| {
            order.events = self.events_for(order_id);
            order
        }))
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut header = order.clone();
        header.events = Vec::new();
        self.headers.lock().unwrap().insert(order.order_id, header);
        Ok(())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let headers = self.headers.lock().unwrap();
        let mut matching: Vec<Order> = headers
            .values()
            .filter(|order| match &filter.finality {
                Some(FinalityFilter::IsFinal(is_final)) => order.is_final == *is_final,
                Some(FinalityFilter::Status(statuses)) => statuses.contains(&order.status),
                None => true,
            })
            .filter(|order| filter.user_id.map(|id| id == order.user_id).unwrap_or(true))
            .cloned()
            .collect();
        drop(headers);

        matching.sort_by(|a, b| {
            let (left, right) = match filter.sort_by {
                SortBy::CreatedAt => (a.created_at, b.created_at),
                SortBy::UpdatedAt => (a.updated_at, b.updated_at),
            };
            match filter.sort_order {
                SortOrder::Asc => left.cmp(&right),
                SortOrder::Desc => right.cmp(&left),
            }
        });

        let start = filter.offset as usize;
        let end = start.saturating_add(filter.limit as usize);
        Ok(matching
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .map(|mut order| {
                order.events = self.events_for(order.order_id);
                order
            })
            .collect())
    }
}
