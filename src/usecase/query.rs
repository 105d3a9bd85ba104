//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The Query usecase: thin read-path wrappers over the Order Repository.
//
// | Component    | Description                                           |
// |--------------|---------------------------------------------------------|
// | QueryUsecase | `get_order` and `list_orders` over the order repository |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    models::{Order, OrderFilter, RepositoryError},
    repositories::OrderRepository,
};

pub struct QueryUsecase {
    order_repo: Arc<dyn OrderRepository>,
}

impl QueryUsecase {
    pub fn new(order_repo: Arc<dyn OrderRepository>) -> Self {
        Self { order_repo }
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        self.order_repo.get(order_id).await
    }

    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        self.order_repo.list(&filter).await
    }
}
