//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Order Repository contract. `get` returns the order joined to its full,
// ascending-by-`created_at` event history; `save` is an idempotent header-only upsert; `list`
// serves the paginated, filtered listing used by the Query usecase.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{Order, OrderFilter, RepositoryError};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Loads an order with its full event history, ascending by `created_at`. `Ok(None)` means
    /// no such order exists.
    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, RepositoryError>;

    /// Idempotent upsert of the order header row. Events are owned by the Event Repository and
    /// are not written here.
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Paginated, filtered listing.
    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError>;
}
