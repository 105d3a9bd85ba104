//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Ingress usecase: a thin adapter between the transport layer and the Order State
// Engine. Parses and validates the webhook payload, calls `engine.handle`, and leaves the
// transport-neutral error unchanged for the API layer to map onto HTTP status codes.
//
// | Component         | Description                                               |
// |--------------------|-------------------------------------------------------------|
// | IngestEventRequest | Validated payload shape for one incoming order event       |
// | IngressUsecase     | Builds an `OrderEvent` and drives it through the engine     |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    models::{EngineError, OrderEvent, OrderStatus},
    services::OrderEngine,
};

/// Raw webhook payload. `order_status` is validated via `OrderStatus::parse`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestEventRequest {
    pub event_id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub order_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct IngressUsecase {
    engine: Arc<OrderEngine>,
}

impl IngressUsecase {
    pub fn new(engine: Arc<OrderEngine>) -> Self {
        Self { engine }
    }

    /// Validates `request` and drives it through the engine. Propagates `EngineError` verbatim;
    /// the API layer owns the mapping onto HTTP status codes.
    pub async fn handle(&self, request: IngestEventRequest) -> Result<(), EngineError> {
        let status = OrderStatus::parse(&request.order_status)?;

        let event = OrderEvent {
            event_id: request.event_id,
            order_id: request.order_id,
            user_id: request.user_id,
            status,
            created_at: request.created_at,
            updated_at: request.updated_at,
            is_final: false,
        };

        self.engine.handle(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{SubscriberHub, FINALIZE_TIMEOUT};
    use crate::infrastructure::memory::new_repositories;

    fn ingress() -> IngressUsecase {
        let (order_repo, event_repo) = new_repositories();
        let hub = SubscriberHub::new();
        let engine = OrderEngine::new(order_repo, event_repo, hub, FINALIZE_TIMEOUT);
        IngressUsecase::new(engine)
    }

    #[tokio::test]
    async fn rejects_unknown_status_before_touching_the_engine() {
        let usecase = ingress();
        let request = IngestEventRequest {
            event_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_status: "banana".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let err = usecase.handle(request).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn creates_order_on_first_event() {
        let usecase = ingress();
        let order_id = Uuid::new_v4();
        let request = IngestEventRequest {
            event_id: Uuid::new_v4(),
            order_id,
            user_id: Uuid::new_v4(),
            order_status: "cool_order_created".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        usecase.handle(request).await.unwrap();
    }
}
