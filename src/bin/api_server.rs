//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Entry point for the ingestion service: loads configuration, runs migrations, wires the
// repositories/engine/hub/usecases together, and serves the HTTP API until a shutdown signal
// arrives.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;
use std::sync::Arc;

use order_lifecycle::domain::services::{OrderEngine, SubscriberHub, FINALIZE_TIMEOUT};
use order_lifecycle::infrastructure::postgres::{self, PostgresEventRepository, PostgresOrderRepository};
use order_lifecycle::usecase::{IngressUsecase, QueryUsecase};
use order_lifecycle::{Api, AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    info!("starting order ingestion service");

    let pool = postgres::connect(&config.postgres_url).await?;
    let order_repo = Arc::new(PostgresOrderRepository::new(pool.clone()));
    let event_repo = Arc::new(PostgresEventRepository::new(pool));

    let hub = SubscriberHub::new();
    let engine = OrderEngine::new(order_repo.clone(), event_repo, hub.clone(), FINALIZE_TIMEOUT);

    let ingress = Arc::new(IngressUsecase::new(engine));
    let query = Arc::new(QueryUsecase::new(order_repo));

    let state = Arc::new(AppState::new(ingress, query, hub));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    Api::new(addr, state).serve().await?;
    Ok(())
}
