//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Postgres-backed `EventRepository`. `create`'s unique-constraint violation on `event_id`
// surfaces through `RepositoryError::conflict` (via `sqlx::Error`'s `is_unique_violation`), which
// the engine maps to `EventConflict`.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    models::{OrderEvent, OrderStatus, RepositoryError},
    repositories::EventRepository,
};

pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn get(&self, event_id: Uuid) -> Result<Option<OrderEvent>, RepositoryError> {
        let row = sqlx::query(
            "SELECT event_id, order_id, user_id, order_status, created_at, updated_at, is_final \
             FROM order_events WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status_str: String = row.try_get("order_status").map_err(|e| RepositoryError::other(e.to_string()))?;
        let status = OrderStatus::parse(&status_str).map_err(|e| RepositoryError::other(e.to_string()))?;
        Ok(Some(OrderEvent {
            event_id: row.try_get("event_id").map_err(|e| RepositoryError::other(e.to_string()))?,
            order_id: row.try_get("order_id").map_err(|e| RepositoryError::other(e.to_string()))?,
            user_id: row.try_get("user_id").map_err(|e| RepositoryError::other(e.to_string()))?,
            status,
            created_at: row.try_get("created_at").map_err(|e| RepositoryError::other(e.to_string()))?,
            updated_at: row.try_get("updated_at").map_err(|e| RepositoryError::other(e.to_string()))?,
            is_final: row.try_get("is_final").map_err(|e| RepositoryError::other(e.to_string()))?,
        }))
    }

    async fn create(&self, event: &OrderEvent) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO order_events \
               (event_id, order_id, user_id, order_status, created_at, updated_at, is_final) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(event.event_id)
        .bind(event.order_id)
        .bind(event.user_id)
        .bind(event.status.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(event.is_final)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, event: &OrderEvent) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE order_events SET order_status = $1, is_final = $2, updated_at = $3 \
             WHERE event_id = $4",
        )
        .bind(event.status.as_str())
        .bind(event.is_final)
        .bind(event.updated_at)
        .bind(event.event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, event_id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM order_events WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
