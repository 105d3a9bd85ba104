pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod usecase;

pub use api::{Api, AppState};
pub use config::Config;
pub use domain::models::{EngineError, Order, OrderEvent, OrderStatus, RepositoryError};
pub use domain::services::{OrderEngine, SubscriberHub};
pub use usecase::{IngestEventRequest, IngressUsecase, QueryUsecase};
