pub mod ingress;
pub mod query;

pub use ingress::{IngestEventRequest, IngressUsecase};
pub use query::QueryUsecase;
