//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Postgres-backed `OrderRepository`. `get` joins the `orders` header row to its full
// `order_events` history in one round trip; `save` is a header-only upsert (`ON CONFLICT`); `list`
// builds the filtered, paginated query from an `OrderFilter`.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    models::{FinalityFilter, Order, OrderEvent, OrderFilter, OrderStatus, RepositoryError, SortBy, SortOrder},
    repositories::OrderRepository,
};

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_event(row: &sqlx::postgres::PgRow) -> Result<OrderEvent, RepositoryError> {
    let status_str: String = row.try_get("order_status").map_err(|e| RepositoryError::other(e.to_string()))?;
    let status = OrderStatus::parse(&status_str).map_err(|e| RepositoryError::other(e.to_string()))?;
    Ok(OrderEvent {
        event_id: row.try_get("event_id").map_err(|e| RepositoryError::other(e.to_string()))?,
        order_id: row.try_get("order_id").map_err(|e| RepositoryError::other(e.to_string()))?,
        user_id: row.try_get("user_id").map_err(|e| RepositoryError::other(e.to_string()))?,
        status,
        created_at: row.try_get("created_at").map_err(|e| RepositoryError::other(e.to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|e| RepositoryError::other(e.to_string()))?,
        is_final: row.try_get("is_final").map_err(|e| RepositoryError::other(e.to_string()))?,
    })
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query(
            "SELECT order_id, user_id, status, is_final, created_at, updated_at \
             FROM orders WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let status_str: String = header.try_get("status").map_err(|e| RepositoryError::other(e.to_string()))?;
        let status = OrderStatus::parse(&status_str).map_err(|e| RepositoryError::other(e.to_string()))?;

        let event_rows = sqlx::query(
            "SELECT event_id, order_id, user_id, order_status, created_at, updated_at, is_final \
             FROM order_events WHERE order_id = $1 ORDER BY created_at ASC, event_id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let events = event_rows
            .iter()
            .map(row_to_event)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Order {
            order_id: header.try_get("order_id").map_err(|e| RepositoryError::other(e.to_string()))?,
            user_id: header.try_get("user_id").map_err(|e| RepositoryError::other(e.to_string()))?,
            status,
            is_final: header.try_get("is_final").map_err(|e| RepositoryError::other(e.to_string()))?,
            events,
            created_at: header.try_get("created_at").map_err(|e| RepositoryError::other(e.to_string()))?,
            updated_at: header.try_get("updated_at").map_err(|e| RepositoryError::other(e.to_string()))?,
        }))
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO orders (order_id, user_id, status, is_final, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (order_id) DO UPDATE SET \
               status = EXCLUDED.status, \
               is_final = EXCLUDED.is_final, \
               updated_at = EXCLUDED.updated_at",
        )
        .bind(order.order_id)
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(order.is_final)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let sort_column = match filter.sort_by {
            SortBy::CreatedAt => "created_at",
            SortBy::UpdatedAt => "updated_at",
        };
        let sort_direction = match filter.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        let mut query = String::from(
            "SELECT order_id, user_id, status, is_final, created_at, updated_at FROM orders WHERE 1 = 1",
        );
        let mut arg_index = 1;

        if filter.user_id.is_some() {
            query.push_str(&format!(" AND user_id = ${arg_index}"));
            arg_index += 1;
        }

        let mut status_values: Vec<String> = Vec::new();
        let mut is_final_value: Option<bool> = None;
        match &filter.finality {
            Some(FinalityFilter::Status(statuses)) => {
                status_values = statuses.iter().map(|s| s.as_str().to_string()).collect();
            }
            Some(FinalityFilter::IsFinal(is_final)) => is_final_value = Some(*is_final),
            None => {}
        }

        if !status_values.is_empty() {
            query.push_str(&format!(" AND status = ANY(${arg_index})"));
            arg_index += 1;
        }
        if is_final_value.is_some() {
            query.push_str(&format!(" AND is_final = ${arg_index}"));
            arg_index += 1;
        }

        query.push_str(&format!(" ORDER BY {sort_column} {sort_direction} LIMIT ${arg_index}"));
        arg_index += 1;
        query.push_str(&format!(" OFFSET ${arg_index}"));

        let mut built = sqlx::query(&query);
        if let Some(user_id) = filter.user_id {
            built = built.bind(user_id);
        }
        if !status_values.is_empty() {
            built = built.bind(status_values);
        }
        if let Some(is_final) = is_final_value {
            built = built.bind(is_final);
        }
        built = built.bind(filter.limit as i64).bind(filter.offset as i64);

        let rows = built.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                let status_str: String = row.try_get("status").map_err(|e| RepositoryError::other(e.to_string()))?;
                let status = OrderStatus::parse(&status_str).map_err(|e| RepositoryError::other(e.to_string()))?;
                Ok(Order {
                    order_id: row.try_get("order_id").map_err(|e| RepositoryError::other(e.to_string()))?,
                    user_id: row.try_get("user_id").map_err(|e| RepositoryError::other(e.to_string()))?,
                    status,
                    is_final: row.try_get("is_final").map_err(|e| RepositoryError::other(e.to_string()))?,
                    events: Vec::new(),
                    created_at: row.try_get("created_at").map_err(|e| RepositoryError::other(e.to_string()))?,
                    updated_at: row.try_get("updated_at").map_err(|e| RepositoryError::other(e.to_string()))?,
                })
            })
            .collect()
    }
}
