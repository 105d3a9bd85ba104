//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Order State Engine, the hard part. `handle` is the single entry point for an
// ingested event: dedupe gate, per-order critical section, creation/terminal/cancel/prefix rules,
// persistence, and hub notification. `OrderEngine` also owns the deferred finalize-watch that
// promotes a `chinazes` order to final after `finalize_timeout` of silence.
//
// | Component   | Description                                                           |
// |-------------|------------------------------------------------------------------------|
// | OrderEngine | Validates, persists and fans out order lifecycle events               |
//--------------------------------------------------------------------------------------------------

use std::{sync::Arc, time::Duration};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    models::{EngineError, Order, OrderEvent, OrderStatus},
    repositories::{EventRepository, OrderRepository},
    services::{
        dedup::{InFlightEvents, InFlightGuard},
        observer::OrderObserver,
    },
};

/// How long a `chinazes` order waits, undisturbed, before the finalize-watch promotes it to
/// final. A build-time constant, not configuration.
pub const FINALIZE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OrderEngine {
    order_repo: Arc<dyn OrderRepository>,
    event_repo: Arc<dyn EventRepository>,
    observer: Arc<dyn OrderObserver>,
    in_flight: InFlightEvents,
    /// The engine-wide critical section. A `tokio::sync::Mutex` because
    /// repository I/O is awaited while it is held, so each order's ingestion is intentionally
    /// serial. `observer.notify` is only ever called while holding it, honoring the `engine_mu` to
    /// `hub_mu` lock order; the observer never calls back into the engine.
    critical_section: tokio::sync::Mutex<()>,
    finalize_timeout: Duration,
}

impl OrderEngine {
    pub fn new(
        order_repo: Arc<dyn OrderRepository>,
        event_repo: Arc<dyn EventRepository>,
        observer: Arc<dyn OrderObserver>,
        finalize_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            order_repo,
            event_repo,
            observer,
            in_flight: InFlightEvents::new(),
            critical_section: tokio::sync::Mutex::new(()),
            finalize_timeout,
        })
    }

    /// Entry point. Steps 1 and 11 live here; steps 2-10 live in
    /// [`Self::process_event`], run under the critical section.
    pub async fn handle(self: &Arc<Self>, event: OrderEvent) -> Result<(), EngineError> {
        // Step 1: dedupe gate. `add` returns false if another in-flight submission already
        // claimed this event id.
        if !self.in_flight.add(event.event_id) {
            return Err(EngineError::EventConflict);
        }
        let _guard = InFlightGuard::new(&self.in_flight, event.event_id);

        match self.process_event(&event).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_domain_error() => Err(err),
            Err(err) => {
                // Step 11: compensate a non-domain failure that occurred after the event row was
                // (possibly) written, best-effort.
                if let Err(delete_err) = self.event_repo.delete(event.event_id).await {
                    error!(
                        event_id = %event.event_id,
                        error = %delete_err,
                        "compensating delete of event row failed"
                    );
                }
                Err(err)
            }
        }
    }

    async fn process_event(self: &Arc<Self>, event: &OrderEvent) -> Result<(), EngineError> {
        // Step 2: enter the engine-wide critical section.
        let _lock = self.critical_section.lock().await;

        // Step 3: order lookup.
        let existing = self.order_repo.get(event.order_id).await?;

        // Step 4: creation rule.
        let mut order = match existing {
            Some(order) => order,
            None => {
                if event.status == OrderStatus::CoolOrderCreated {
                    let fresh = Order::new_from_creation_event(event);
                    self.order_repo.save(&fresh).await?;
                    fresh
                } else {
                    return Err(EngineError::OrderNotFound);
                }
            }
        };

        // Step 5: terminal guard.
        if order.is_final {
            return Err(EngineError::OrderAlreadyFinal);
        }

        // Step 6: persist event. A unique-constraint violation surfaces as `EventConflict`
        // through `RepositoryError`'s conflict flag.
        self.event_repo.create(event).await?;

        // Step 7: merge & sort (I1).
        order.push_event_sorted(event.clone());

        // Step 8: cancel short-circuit, regardless of position in the history.
        if event.status.is_cancel() {
            order.is_final = true;
            order.status = event.status;
            order.updated_at = event.updated_at;
            self.order_repo.save(&order).await?;
            self.observer.notify(&order, event);
            info!(order_id = %order.order_id, status = %order.status, "order cancelled");
            return Ok(());
        }

        // Step 9: prefix validation. A non-advanceable order accepts and persists the event but
        // leaves the header untouched and emits no notification.
        if !order.is_advanceable() {
            return Ok(());
        }

        // Step 10: advance.
        let last = order
            .last_event()
            .cloned()
            .expect("an event was just pushed onto order.events");
        order.status = last.status;
        order.updated_at = last.updated_at;

        if last.status == OrderStatus::Chinazes {
            self.spawn_finalize_watch(order.order_id);
        }
        if last.status.is_refund() {
            order.is_final = true;
        }

        self.order_repo.save(&order).await?;
        self.observer.notify(&order, &last);
        Ok(())
    }

    /// Deferred auto-finalize of `chinazes`. Sleeps outside the lock, then
    /// re-acquires it and re-reads the order before mutating, since it must never act on a stale view.
    fn spawn_finalize_watch(self: &Arc<Self>, order_id: Uuid) {
        let this = self.clone();
        tokio::spawn(async move {
            this.finalize_watch(order_id).await;
        });
    }

    async fn finalize_watch(&self, order_id: Uuid) {
        tokio::time::sleep(self.finalize_timeout).await;

        let _lock = self.critical_section.lock().await;

        let order = match self.order_repo.get(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(%order_id, "finalize-watch: order vanished");
                return;
            }
            Err(err) => {
                warn!(%order_id, error = %err, "finalize-watch: failed to reload order");
                return;
            }
        };

        if order.status != OrderStatus::Chinazes || order.is_final {
            return;
        }

        let mut order = order;
        order.is_final = true;

        let mut last_event = match order.last_event().cloned() {
            Some(event) => event,
            None => return,
        };
        last_event.is_final = true;
        last_event.updated_at = last_event.updated_at.max(chrono::Utc::now());

        if let Err(err) = self.order_repo.save(&order).await {
            warn!(%order_id, error = %err, "finalize-watch: failed to save order");
            return;
        }
        if let Err(err) = self.event_repo.update(&last_event).await {
            warn!(%order_id, error = %err, "finalize-watch: failed to update event");
            return;
        }

        self.observer.notify(&order, &last_event);
        info!(%order_id, "order auto-finalized after chinazes timeout");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use chrono::Utc;

    use crate::infrastructure::memory::new_repositories;

    #[derive(Default)]
    struct RecordingObserver {
        notifications: StdMutex<Vec<(Order, OrderEvent)>>,
    }

    impl OrderObserver for RecordingObserver {
        fn notify(&self, order: &Order, event: &OrderEvent) {
            self.notifications.lock().unwrap().push((order.clone(), event.clone()));
        }
    }

    fn engine_with_observer(
        finalize_timeout: Duration,
    ) -> (Arc<OrderEngine>, Arc<RecordingObserver>) {
        let (order_repo, event_repo) = new_repositories();
        let observer = Arc::new(RecordingObserver::default());
        let engine = OrderEngine::new(order_repo, event_repo, observer.clone(), finalize_timeout);
        (engine, observer)
    }

    fn event(order_id: Uuid, status: OrderStatus, minute: i64) -> OrderEvent {
        let ts = Utc::now() + chrono::Duration::minutes(minute);
        OrderEvent {
            event_id: Uuid::new_v4(),
            order_id,
            user_id: Uuid::new_v4(),
            status,
            created_at: ts,
            updated_at: ts,
            is_final: false,
        }
    }

    #[tokio::test]
    async fn happy_path_walks_the_canonical_sequence_to_final() {
        let (engine, observer) = engine_with_observer(FINALIZE_TIMEOUT);
        let order_id = Uuid::new_v4();

        for (i, status) in crate::domain::models::CANONICAL_SEQUENCE.into_iter().enumerate() {
            let ev = event(order_id, status, i as i64);
            engine.handle(ev).await.unwrap();
        }

        let order = engine.order_repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::GiveMyMoneyBack);
        assert!(order.is_final);
        assert_eq!(observer.notifications.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn out_of_order_middle_event_is_stored_but_does_not_advance() {
        let (engine, observer) = engine_with_observer(FINALIZE_TIMEOUT);
        let order_id = Uuid::new_v4();

        engine
            .handle(event(order_id, OrderStatus::CoolOrderCreated, 0))
            .await
            .unwrap();
        // Skips sbu_verification_pending: arrives out of order.
        engine
            .handle(event(order_id, OrderStatus::ConfirmedByMayor, 2))
            .await
            .unwrap();

        let order = engine.order_repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::CoolOrderCreated);
        assert_eq!(order.events.len(), 2);
        assert_eq!(observer.notifications.lock().unwrap().len(), 1);

        // The missing middle event arrives late; the order now advances all the way through it.
        engine
            .handle(event(order_id, OrderStatus::SbuVerificationPending, 1))
            .await
            .unwrap();
        let order = engine.order_repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::ConfirmedByMayor);
        assert_eq!(observer.notifications.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_event_id_submitted_concurrently_is_rejected_once() {
        let (engine, _observer) = engine_with_observer(FINALIZE_TIMEOUT);
        let order_id = Uuid::new_v4();
        let ev = event(order_id, OrderStatus::CoolOrderCreated, 0);

        let (r1, r2) = tokio::join!(engine.handle(ev.clone()), engine.handle(ev));
        let oks = [&r1, &r2].into_iter().filter(|r| r.is_ok()).count();
        let conflicts = [r1, r2]
            .into_iter()
            .filter(|r| matches!(r, Err(EngineError::EventConflict)))
            .count();
        assert_eq!(oks, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn cancel_in_the_middle_finalizes_immediately() {
        let (engine, observer) = engine_with_observer(FINALIZE_TIMEOUT);
        let order_id = Uuid::new_v4();

        engine
            .handle(event(order_id, OrderStatus::CoolOrderCreated, 0))
            .await
            .unwrap();
        engine
            .handle(event(order_id, OrderStatus::SbuVerificationPending, 1))
            .await
            .unwrap();
        engine
            .handle(event(order_id, OrderStatus::ChangedMyMind, 2))
            .await
            .unwrap();

        let order = engine.order_repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::ChangedMyMind);
        assert!(order.is_final);
        assert_eq!(observer.notifications.lock().unwrap().len(), 3);

        let err = engine
            .handle(event(order_id, OrderStatus::ConfirmedByMayor, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OrderAlreadyFinal));
    }

    #[tokio::test]
    async fn chinazes_auto_finalizes_after_the_watch_timeout() {
        let (engine, _observer) = engine_with_observer(Duration::from_millis(20));
        let order_id = Uuid::new_v4();

        engine
            .handle(event(order_id, OrderStatus::CoolOrderCreated, 0))
            .await
            .unwrap();
        engine
            .handle(event(order_id, OrderStatus::SbuVerificationPending, 1))
            .await
            .unwrap();
        engine
            .handle(event(order_id, OrderStatus::ConfirmedByMayor, 2))
            .await
            .unwrap();
        engine
            .handle(event(order_id, OrderStatus::Chinazes, 3))
            .await
            .unwrap();

        let order = engine.order_repo.get(order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Chinazes);
        assert!(!order.is_final);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let order = engine.order_repo.get(order_id).await.unwrap().unwrap();
        assert!(order.is_final);
    }

    #[tokio::test]
    async fn wrong_initial_status_for_an_unknown_order_is_rejected() {
        let (engine, _observer) = engine_with_observer(FINALIZE_TIMEOUT);
        let order_id = Uuid::new_v4();

        let err = engine
            .handle(event(order_id, OrderStatus::SbuVerificationPending, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OrderNotFound));
    }
}
