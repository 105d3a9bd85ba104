//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The event record ingested from the payment gateway webhook. `created_at` is the sole ordering
// key within an order's history; `event_id` is the sole dedupe key across the whole store.
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::OrderStatus;

/// A single reported transition for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_final: bool,
}

impl OrderEvent {
    /// Ordering key used when sorting an order's event history (I1): `created_at` ascending,
    /// ties broken by `event_id` lexicographically.
    pub fn sort_key(&self) -> (DateTime<Utc>, String) {
        (self.created_at, self.event_id.to_string())
    }
}
