//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Subscriber Fan-out Hub. Maintains a per-order subscriber set and a replay cache
// of already-delivered event ids, pushes new events without ever blocking the engine, and tears
// subscribers down on idle timeout, final event, or client disconnect.
//
// | Component        | Description                                                      |
// |-------------------|--------------------------------------------------------------------|
// | SubscriberHub    | Per-order registry, replay cache, non-blocking fan-out            |
// | SubscriberHandle | RAII handle returned by `register`; dropping it tears the session down |
//--------------------------------------------------------------------------------------------------

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::{mpsc, Notify},
    task::AbortHandle,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    models::{Order, OrderEvent},
    services::observer::OrderObserver,
};

/// Depth of the per-subscriber push channel. A full channel means a slow consumer; the engine
/// must never block on it, so sends are always non-blocking.
const CHANNEL_DEPTH: usize = 1;

/// Default idle timeout for a subscriber with no activity. A build-time constant.
pub const SUBSCRIBER_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

struct SubscriberEntry {
    tx: mpsc::Sender<OrderEvent>,
    idle_reset: Arc<Notify>,
    watchdog: AbortHandle,
}

#[derive(Default)]
struct HubState {
    clients: HashMap<Uuid, HashMap<Uuid, SubscriberEntry>>,
    replay_cache: HashMap<Uuid, Vec<Uuid>>,
}

#[derive(Default)]
pub struct SubscriberHub {
    state: Mutex<HubState>,
}

/// A live subscription. The owning HTTP handler reads `rx`; dropping the handle (stream
/// cancellation, client disconnect, or explicit close) unregisters the subscriber and aborts its
/// idle watchdog, the single teardown path for any subscription.
pub struct SubscriberHandle {
    pub subscriber_id: Uuid,
    pub order_id: Uuid,
    pub rx: mpsc::Receiver<OrderEvent>,
    hub: Arc<SubscriberHub>,
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        self.hub.unregister(self.order_id, self.subscriber_id);
    }
}

impl SubscriberHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a new subscriber for `order_id`. Under the hub lock, replays every event in
    /// `history` not already in the replay cache (best-effort, non-blocking), then starts the
    /// idle watchdog.
    pub fn register(
        self: &Arc<Self>,
        order_id: Uuid,
        history: &[OrderEvent],
        idle_timeout: Duration,
    ) -> SubscriberHandle {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        let subscriber_id = Uuid::new_v4();
        let idle_reset = Arc::new(Notify::new());

        {
            let mut state = self.state.lock().unwrap();
            let replay = state.replay_cache.entry(order_id).or_default();
            for event in history {
                if !replay.contains(&event.event_id) {
                    let _ = tx.try_send(event.clone());
                    replay.push(event.event_id);
                }
            }

            let watchdog =
                self.spawn_watchdog(order_id, subscriber_id, idle_timeout, idle_reset.clone());
            state
                .clients
                .entry(order_id)
                .or_default()
                .insert(subscriber_id, SubscriberEntry { tx, idle_reset, watchdog });
        }

        debug!(%order_id, %subscriber_id, "subscriber registered");
        SubscriberHandle {
            subscriber_id,
            order_id,
            rx,
            hub: self.clone(),
        }
    }

    /// Removes a subscriber, aborts its watchdog, and drops the order's replay cache once its
    /// last subscriber is gone.
    pub fn unregister(&self, order_id: Uuid, subscriber_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(clients) = state.clients.get_mut(&order_id) {
            if let Some(entry) = clients.remove(&subscriber_id) {
                entry.watchdog.abort();
                debug!(%order_id, %subscriber_id, "subscriber unregistered");
            }
            if clients.is_empty() {
                state.clients.remove(&order_id);
                state.replay_cache.remove(&order_id);
            }
        }
    }

    /// Best-effort, non-blocking fan-out of `event` to every subscriber of `order.order_id`.
    /// Drops the replay cache entry once the order (or this event) has gone final.
    pub fn notify(&self, order: &Order, event: &OrderEvent) {
        let mut state = self.state.lock().unwrap();
        if let Some(clients) = state.clients.get(&order.order_id) {
            for entry in clients.values() {
                if entry.tx.try_send(event.clone()).is_err() {
                    debug!(order_id = %order.order_id, "dropping push to slow/closed subscriber");
                }
                entry.idle_reset.notify_one();
            }
        }

        state
            .replay_cache
            .entry(order.order_id)
            .or_default()
            .push(event.event_id);

        if event.is_final || order.is_final {
            state.replay_cache.remove(&order.order_id);
        }
    }

    pub fn subscriber_count(&self, order_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .clients
            .get(&order_id)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    fn spawn_watchdog(
        self: &Arc<Self>,
        order_id: Uuid,
        subscriber_id: Uuid,
        idle_timeout: Duration,
        idle_reset: Arc<Notify>,
    ) -> AbortHandle {
        let hub = self.clone();
        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(idle_timeout) => {
                        debug!(%order_id, %subscriber_id, "subscriber idle timeout");
                        hub.unregister(order_id, subscriber_id);
                        break;
                    }
                    _ = idle_reset.notified() => {
                        continue;
                    }
                }
            }
        });
        join.abort_handle()
    }
}

impl OrderObserver for SubscriberHub {
    fn notify(&self, order: &Order, event: &OrderEvent) {
        SubscriberHub::notify(self, order, event)
    }
}
