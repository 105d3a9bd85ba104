//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The subscription endpoint: `GET /orders/{order_id}/events` streams `message` SSE
// events carrying the JSON form of an `OrderEvent`. Registers with the hub, replays history, and
// relies on the `SubscriberHandle`'s `Drop` to tear the session down on stream cancellation,
// final event, or idle timeout.
//--------------------------------------------------------------------------------------------------

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use uuid::Uuid;

use crate::{
    api::{error::ApiError, AppState},
    domain::{
        models::OrderEvent,
        services::{SubscriberHandle, SUBSCRIBER_IDLE_TIMEOUT},
    },
};

/// Fold-state for the event stream: a final order plays back its stored history and ends, a
/// non-final order stays live on the hub until its final event or disconnect.
enum SubscriberState {
    Final(std::vec::IntoIter<OrderEvent>),
    Live(SubscriberHandle),
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let order = state
        .query
        .get_order(order_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // An already-final order sends its stored history, then closes, without registering on the hub.
    let sub_state = if order.is_final {
        SubscriberState::Final(order.events.into_iter())
    } else {
        let handle = state.hub.register(order_id, &order.events, SUBSCRIBER_IDLE_TIMEOUT);
        SubscriberState::Live(handle)
    };

    let stream = stream::unfold(Some(sub_state), move |sub_state| async move {
        match sub_state? {
            SubscriberState::Final(mut events) => {
                let event = events.next()?;
                let sse_event = Event::default().event("message").json_data(&event).ok()?;
                Some((Ok(sse_event), Some(SubscriberState::Final(events))))
            }
            SubscriberState::Live(mut handle) => {
                let event = handle.rx.recv().await?;
                let sse_event = Event::default().event("message").json_data(&event).ok()?;

                if event.is_final {
                    Some((Ok(sse_event), None))
                } else {
                    Some((Ok(sse_event), Some(SubscriberState::Live(handle))))
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
