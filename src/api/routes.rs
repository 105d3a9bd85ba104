//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                      | Return Type        |
// |---------------|--------------------------------------------------|---------------------|
// | health        | Liveness probe                                    | impl IntoResponse   |
// | ingest_event  | Webhook ingress for one order lifecycle event     | ApiResult<Response> |
// | get_order     | Fetch a single order with its event history       | ApiResult<Response> |
// | list_orders   | Paginated, filtered order listing                 | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::{dto::OrderResponse, error::ApiResult, AppState, ApiError, ListOrdersQuery};
use crate::usecase::IngestEventRequest;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /webhooks/payments/orders` - ingests one order lifecycle event.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestEventRequest>,
) -> ApiResult<Response> {
    state.ingress.handle(request).await?;
    Ok(StatusCode::OK.into_response())
}

/// `GET /orders/{order_id}` - a single order with its full event history.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Response> {
    let order = state
        .query
        .get_order(order_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(OrderResponse::from(order)).into_response())
}

/// `GET /orders` - paginated, filtered order listing.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Response> {
    let filter = query.into_filter()?;
    let orders = state.query.list_orders(filter).await?;
    let response: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(response).into_response())
}
