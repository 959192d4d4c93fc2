// Capabilities the engine consumes - separated for testability

use async_trait::async_trait;

use crate::shipping_label::data::Data;
use crate::shipping_label::errors::{RepositoryError, ValidationError};
use crate::shipping_label::repository::OrderId;
use crate::shipping_label::types::{Address, ValidationResult};

/// Remote address normalization service
#[async_trait]
pub trait AddressValidator: Send + Sync {
    /// Check an address. Must be idempotent; the dispatcher bounds the call
    /// with its own timeout.
    async fn validate(&self, address: &Address) -> Result<ValidationResult, ValidationError>;
}

/// Source of the starting snapshot for an order
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Called exactly once when a session starts
    async fn load_initial_data(&self, order_id: OrderId) -> Result<Data, RepositoryError>;
}
