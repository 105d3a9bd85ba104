//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The closed set of order lifecycle statuses emitted by the upstream payment gateway, plus the
// classification predicates the engine needs to decide whether a status is a terminal cancel, a
// terminal refund, or a step along the canonical happy path.
//
// | Component       | Description                                                    |
// |------------------|----------------------------------------------------------------|
// | OrderStatus      | The seven symbolic statuses, with stable string forms          |
// | CANONICAL_SEQUENCE | The five-element happy-path prefix                            |
//--------------------------------------------------------------------------------------------------

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status reported by the upstream payment gateway for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    CoolOrderCreated,
    SbuVerificationPending,
    ConfirmedByMayor,
    Chinazes,
    ChangedMyMind,
    Failed,
    GiveMyMoneyBack,
}

/// The happy-path sequence a healthy order's events walk through, in order.
pub const CANONICAL_SEQUENCE: [OrderStatus; 5] = [
    OrderStatus::CoolOrderCreated,
    OrderStatus::SbuVerificationPending,
    OrderStatus::ConfirmedByMayor,
    OrderStatus::Chinazes,
    OrderStatus::GiveMyMoneyBack,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct InvalidStatus(pub String);

impl OrderStatus {
    /// Parses the wire string form of a status, rejecting anything unknown.
    pub fn parse(value: &str) -> Result<Self, InvalidStatus> {
        match value {
            "cool_order_created" => Ok(Self::CoolOrderCreated),
            "sbu_verification_pending" => Ok(Self::SbuVerificationPending),
            "confirmed_by_mayor" => Ok(Self::ConfirmedByMayor),
            "chinazes" => Ok(Self::Chinazes),
            "changed_my_mind" => Ok(Self::ChangedMyMind),
            "failed" => Ok(Self::Failed),
            "give_my_money_back" => Ok(Self::GiveMyMoneyBack),
            other => Err(InvalidStatus(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoolOrderCreated => "cool_order_created",
            Self::SbuVerificationPending => "sbu_verification_pending",
            Self::ConfirmedByMayor => "confirmed_by_mayor",
            Self::Chinazes => "chinazes",
            Self::ChangedMyMind => "changed_my_mind",
            Self::Failed => "failed",
            Self::GiveMyMoneyBack => "give_my_money_back",
        }
    }

    /// Cancel statuses are terminal and may be applied from any non-terminal state.
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::ChangedMyMind | Self::Failed)
    }

    /// The refund status is terminal and only ever the tail of the happy path.
    pub fn is_refund(&self) -> bool {
        matches!(self, Self::GiveMyMoneyBack)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_cancel() || self.is_refund()
    }

    /// 1-based position in the canonical happy path, if this status is on it.
    pub fn canonical_position(&self) -> Option<usize> {
        CANONICAL_SEQUENCE.iter().position(|s| s == self).map(|i| i + 1)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
