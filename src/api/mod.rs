//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The HTTP transport layer: ingress webhook, order queries, and the SSE subscription
// endpoint, all sharing one `AppState`.
//
// | Component | Description                                                             |
// |-----------|--------------------------------------------------------------------------|
// | AppState  | Shared handles to the Ingress/Query usecases and the subscriber hub      |
// | Api       | Builds the router and serves it                                         |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;
mod sse;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use dto::{ListOrdersQuery, OrderResponse};
pub use error::{ApiError, ApiResult};

use crate::domain::services::SubscriberHub;
use crate::usecase::{IngressUsecase, QueryUsecase};

/// Shared application state accessible by all handlers.
pub struct AppState {
    pub ingress: Arc<IngressUsecase>,
    pub query: Arc<QueryUsecase>,
    pub hub: Arc<SubscriberHub>,
}

impl AppState {
    pub fn new(ingress: Arc<IngressUsecase>, query: Arc<QueryUsecase>, hub: Arc<SubscriberHub>) -> Self {
        Self { ingress, query, hub }
    }
}

/// The assembled HTTP API.
pub struct Api {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl Api {
    pub fn new(addr: SocketAddr, state: Arc<AppState>) -> Self {
        Self { addr, state }
    }

    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        Router::new()
            .route("/health", get(routes::health))
            .route("/webhooks/payments/orders", axum::routing::post(routes::ingest_event))
            .route("/orders", get(routes::list_orders))
            .route("/orders/:order_id", get(routes::get_order))
            .route("/orders/:order_id/events", get(sse::subscribe))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.routes();
        tracing::info!(addr = %self.addr, "API listening");
        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}
