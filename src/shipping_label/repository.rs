use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::shipping_label::data::Data;
use crate::shipping_label::errors::RepositoryError;
use crate::shipping_label::traits::LabelRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repository backed by snapshots registered up front
#[derive(Debug, Default, Clone)]
pub struct InMemoryLabelRepository {
    orders: HashMap<OrderId, Data>,
}

impl InMemoryLabelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order_id: OrderId, data: Data) -> Self {
        self.orders.insert(order_id, data);
        self
    }
}

#[async_trait]
impl LabelRepository for InMemoryLabelRepository {
    async fn load_initial_data(&self, order_id: OrderId) -> Result<Data, RepositoryError> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or(RepositoryError::OrderNotFound(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipping_label::types::Address;

    #[test]
    fn test_loads_registered_order() {
        let data = Data::new().with_origin_address(Address {
            city: "Springfield".to_string(),
            ..Default::default()
        });
        let repository = InMemoryLabelRepository::new().with_order(OrderId(123), data.clone());

        let loaded = tokio_test::block_on(repository.load_initial_data(OrderId(123))).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_unknown_order_is_an_error() {
        let repository = InMemoryLabelRepository::new();

        let result = tokio_test::block_on(repository.load_initial_data(OrderId(9)));
        assert!(matches!(result, Err(RepositoryError::OrderNotFound(OrderId(9)))));
    }
}
