//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The notification seam the engine drives on every accepted transition.
// `SubscriberHub` is the production implementation; `TracingObserver` is a log-only stand-in for
// tests and for a deployment that runs without live SSE fan-out.
//--------------------------------------------------------------------------------------------------

use crate::domain::models::{Order, OrderEvent};

/// Something the engine tells about every accepted order transition.
pub trait OrderObserver: Send + Sync {
    fn notify(&self, order: &Order, event: &OrderEvent);
}

/// Logs each transition instead of fanning it out to subscribers.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl OrderObserver for TracingObserver {
    fn notify(&self, order: &Order, event: &OrderEvent) {
        tracing::info!(
            order_id = %order.order_id,
            status = %event.status,
            is_final = order.is_final,
            "order updated"
        );
    }
}
