//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// HTTP-facing error mapping: `EngineError` and `RepositoryError` convert into `ApiError`,
// which in turn implements `IntoResponse` with the status codes the ingress endpoint contract
// requires.
//
// | Component | Description                                      |
// |-----------|----------------------------------------------------|
// | ApiError  | Transport-neutral error mapped onto an HTTP status |
//--------------------------------------------------------------------------------------------------

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::models::{EngineError, RepositoryError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid payload: {0}")]
    BadRequest(String),

    #[error("order not found")]
    NotFound,

    #[error("event already being processed or already exists")]
    Conflict,

    #[error("order is already in a final state")]
    Gone,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Conflict => (StatusCode::CONFLICT, self.to_string()),
            Self::Gone => (StatusCode::GONE, self.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EventConflict => Self::Conflict,
            EngineError::OrderAlreadyFinal => Self::Gone,
            EngineError::OrderNotFound => Self::NotFound,
            EngineError::InvalidPayload(msg) => Self::BadRequest(msg),
            EngineError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(err.0)
    }
}
