// Test doubles for the address validator, shared with integration tests
// through the `testing` feature

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::shipping_label::errors::ValidationError;
use crate::shipping_label::traits::AddressValidator;
use crate::shipping_label::types::{Address, ValidationResult};

pub type Gate = oneshot::Sender<Result<ValidationResult, ValidationError>>;

/// Validator whose calls block until the test releases them, in call order.
/// Calls without a registered gate answer Valid immediately.
#[derive(Default)]
pub struct GatedValidator {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<ValidationResult, ValidationError>>>>,
    calls: AtomicUsize,
}

impl GatedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the gate for the next call
    pub fn gate(&self) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressValidator for GatedValidator {
    async fn validate(&self, address: &Address) -> Result<ValidationResult, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ValidationError::Transport("gate dropped".to_string()))),
            None => Ok(ValidationResult::Valid(address.clone())),
        }
    }
}
