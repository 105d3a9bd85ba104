//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Event Repository contract. `create`'s unique constraint on `event_id` is the
// authoritative dedupe backstop behind the in-flight set; `update` is used only by the
// finalize-watch to flip `is_final`; `delete` is the best-effort compensating rollback for
// non-domain failures after `create` has already committed.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{OrderEvent, RepositoryError};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn get(&self, event_id: Uuid) -> Result<Option<OrderEvent>, RepositoryError>;

    /// Fails if `event_id` already exists; the unique constraint is authoritative (I5).
    async fn create(&self, event: &OrderEvent) -> Result<(), RepositoryError>;

    /// Used only to flip `is_final` (and refresh `updated_at`) during auto-finalize.
    async fn update(&self, event: &OrderEvent) -> Result<(), RepositoryError>;

    /// Best-effort rollback of a row written by `create` when a later, non-domain step fails.
    async fn delete(&self, event_id: Uuid) -> Result<(), RepositoryError>;
}
