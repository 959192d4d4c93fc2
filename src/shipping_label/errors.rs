use std::time::Duration;
use thiserror::Error;

use crate::shipping_label::repository::OrderId;
use crate::shipping_label::types::{FlowStep, ValidationResult};

/// Reason sent to the workflow when a validation call runs out of time
pub const TIMEOUT_REASON: &str = "timeout";

/// Failures of a single address validation attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Address validation timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("Address rejected by validation service: {0}")]
    Rejected(String),
    #[error("Address validation service unreachable: {0}")]
    Transport(String),
    #[error("Validation for {step} superseded by a newer request")]
    Superseded { step: FlowStep },
}

impl ValidationError {
    /// Verdict the workflow sees for this failure. Superseded requests never
    /// reach the workflow.
    pub fn into_verdict(self) -> Option<ValidationResult> {
        match self {
            ValidationError::Timeout { .. } => Some(ValidationResult::invalid(TIMEOUT_REASON)),
            ValidationError::Rejected(reason) | ValidationError::Transport(reason) => {
                Some(ValidationResult::invalid(reason))
            }
            ValidationError::Superseded { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Failed to load order {order_id}: {reason}")]
    LoadFailed { order_id: OrderId, reason: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to load initial label data: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Label creation session is closed")]
    Closed,
}
