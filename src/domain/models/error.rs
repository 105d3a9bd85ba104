//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The domain error taxonomy. Domain errors propagate verbatim out of the engine;
// everything else is folded into `Internal` before it crosses the engine boundary.
//--------------------------------------------------------------------------------------------------

use thiserror::Error;

use super::status::InvalidStatus;

/// Errors the Order State Engine and the repositories it drives can produce.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Duplicate `event_id`, in-flight or already persisted.
    #[error("event already being processed or already exists")]
    EventConflict,

    /// Mutation attempted against a terminal order.
    #[error("order is already in a final state")]
    OrderAlreadyFinal,

    /// A non-`cool_order_created` event arrived for an order that does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// Malformed input at the ingress boundary.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Any repository or infrastructure failure, wrapped with context.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Domain errors are returned verbatim; everything else is `Internal`.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::EventConflict | Self::OrderAlreadyFinal | Self::OrderNotFound
        )
    }
}

impl From<InvalidStatus> for EngineError {
    fn from(err: InvalidStatus) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Opaque failure surfaced by a repository implementation. `conflict` is set when the
/// implementation can tell the failure was a unique-constraint violation; the engine maps everything
/// else to `Internal`.
#[derive(Debug, Error)]
#[error("repository error: {0}")]
pub struct RepositoryError(pub String, pub bool);

impl RepositoryError {
    pub fn other(message: impl Into<String>) -> Self {
        Self(message.into(), false)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self(message.into(), true)
    }

    pub fn is_conflict(&self) -> bool {
        self.1
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        let is_conflict = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
        Self(err.to_string(), is_conflict)
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        if err.is_conflict() {
            Self::EventConflict
        } else {
            Self::Internal(err.0)
        }
    }
}
