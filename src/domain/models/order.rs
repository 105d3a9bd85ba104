//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The order aggregate: a header row plus its in-memory event history. `OrderFilter` is the
// paginated-listing query shape for the Query usecase.
//
// | Component    | Description                                                        |
// |--------------|---------------------------------------------------------------------|
// | Order        | Header + sorted event history + derived last-event pointer          |
// | OrderFilter  | Mutually-exclusive status/is_final filter with pagination & sort    |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{event::OrderEvent, status::OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub is_final: bool,
    #[serde(skip)]
    pub events: Vec<OrderEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds the order created by the first successfully-ingested
    /// `cool_order_created` event.
    pub fn new_from_creation_event(event: &OrderEvent) -> Self {
        Self {
            order_id: event.order_id,
            user_id: event.user_id,
            status: event.status,
            is_final: false,
            events: Vec::new(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }

    /// The most recently positioned event in the sorted history, if any.
    pub fn last_event(&self) -> Option<&OrderEvent> {
        self.events.last()
    }

    /// Appends `event` and restores the I1 ordering invariant (stable sort by `created_at`,
    /// ties broken by `event_id`).
    pub fn push_event_sorted(&mut self, event: OrderEvent) {
        self.events.push(event);
        self.events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    fn status_sequence(&self) -> Vec<OrderStatus> {
        self.events.iter().map(|e| e.status).collect()
    }

    /// I2: the order is advanceable iff its status sequence (excluding any trailing cancel,
    /// which short-circuits before this check ever runs) is a proper prefix of the canonical
    /// happy path.
    pub fn is_advanceable(&self) -> bool {
        let seq = self.status_sequence();
        if seq.len() > super::status::CANONICAL_SEQUENCE.len() {
            return false;
        }
        seq.iter()
            .zip(super::status::CANONICAL_SEQUENCE.iter())
            .all(|(a, b)| a == b)
    }
}

/// Sort key accepted by `OrderFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Either a set of statuses or a final-state flag, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalityFilter {
    Status(Vec<OrderStatus>),
    IsFinal(bool),
}

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub finality: Option<FinalityFilter>,
    pub user_id: Option<Uuid>,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            finality: None,
            user_id: None,
            limit: 10,
            offset: 0,
            sort_by: SortBy::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ev(status: OrderStatus, minute: i64) -> OrderEvent {
        OrderEvent {
            event_id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            user_id: Uuid::nil(),
            status,
            created_at: Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(),
            updated_at: Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(),
            is_final: false,
        }
    }

    #[test]
    fn advanceable_prefix_and_full_sequence() {
        let mut order = Order::new_from_creation_event(&ev(OrderStatus::CoolOrderCreated, 0));
        order.push_event_sorted(ev(OrderStatus::CoolOrderCreated, 0));
        assert!(order.is_advanceable());

        order.push_event_sorted(ev(OrderStatus::SbuVerificationPending, 1));
        assert!(order.is_advanceable());

        // Out-of-order insert that breaks the prefix (skips confirmed_by_mayor).
        order.push_event_sorted(ev(OrderStatus::Chinazes, 2));
        assert!(!order.is_advanceable());
    }

    #[test]
    fn sorted_by_created_at_ascending() {
        let mut order = Order::new_from_creation_event(&ev(OrderStatus::CoolOrderCreated, 0));
        order.push_event_sorted(ev(OrderStatus::CoolOrderCreated, 0));
        order.push_event_sorted(ev(OrderStatus::ConfirmedByMayor, 2));
        order.push_event_sorted(ev(OrderStatus::SbuVerificationPending, 1));
        let seq: Vec<_> = order.events.iter().map(|e| e.status).collect();
        assert_eq!(
            seq,
            vec![
                OrderStatus::CoolOrderCreated,
                OrderStatus::SbuVerificationPending,
                OrderStatus::ConfirmedByMayor
            ]
        );
    }
}
