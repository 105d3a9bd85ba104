//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Request/response shapes for the HTTP layer. `ListOrdersQuery` binds the `/orders`
// query string and enforces the mutual exclusion between `status` and `is_final` before it ever
// reaches the Query usecase.
//
// | Component        | Description                                                    |
// |-------------------|------------------------------------------------------------------|
// | ListOrdersQuery   | Raw `/orders` query params                                      |
// | OrderResponse     | An order with its full event history, for JSON responses        |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::error::ApiError,
    domain::models::{FinalityFilter, Order, OrderEvent, OrderFilter, OrderStatus, SortBy, SortOrder},
};

#[derive(Debug, Clone, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub is_final: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ListOrdersQuery {
    /// Builds an `OrderFilter`, requiring exactly one of `status` or `is_final`.
    pub fn into_filter(self) -> Result<OrderFilter, ApiError> {
        let finality = match (self.status, self.is_final) {
            (Some(_), Some(_)) => {
                return Err(ApiError::BadRequest(
                    "status and is_final are mutually exclusive".to_string(),
                ))
            }
            (Some(status), None) => {
                let statuses = status
                    .split(',')
                    .map(OrderStatus::parse)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                Some(FinalityFilter::Status(statuses))
            }
            (None, Some(is_final)) => Some(FinalityFilter::IsFinal(is_final)),
            (None, None) => {
                return Err(ApiError::BadRequest(
                    "must specify either status or is_final".to_string(),
                ))
            }
        };

        let defaults = OrderFilter::default();
        Ok(OrderFilter {
            finality,
            user_id: self.user_id,
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub is_final: bool,
    pub events: Vec<OrderEvent>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            user_id: order.user_id,
            status: order.status,
            is_final: order.is_final,
            events: order.events,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
