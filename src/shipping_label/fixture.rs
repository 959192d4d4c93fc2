// File-backed order fixtures for running the workflow without remote services

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::shipping_label::data::Data;
use crate::shipping_label::errors::ValidationError;
use crate::shipping_label::repository::{InMemoryLabelRepository, OrderId};
use crate::shipping_label::traits::AddressValidator;
use crate::shipping_label::types::*;

/// Scripted verdict for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixtureOutcome {
    Valid,
    Suggested { suggested: Address },
    Invalid { reason: String },
    TransportFailure { message: String },
    /// Never answers; exercises the dispatcher timeout
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub address: Address,
    pub outcome: FixtureOutcome,
}

/// An order's starting data plus the validator verdicts to replay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelFixture {
    pub order_id: u64,
    #[serde(default)]
    pub origin_address: Option<Address>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub packaging: Option<PackageSelection>,
    #[serde(default)]
    pub customs: Option<CustomsDeclaration>,
    #[serde(default)]
    pub carrier: Option<CarrierSelection>,
    #[serde(default)]
    pub payment: Option<PaymentSelection>,
    #[serde(default)]
    pub validation: Vec<ValidationRule>,
    /// Simulated round trip of the validation service
    #[serde(default)]
    pub latency_ms: u64,
}

impl LabelFixture {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid label fixture")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn order_id(&self) -> OrderId {
        OrderId(self.order_id)
    }

    pub fn initial_data(&self) -> Data {
        Data {
            origin_address: self.origin_address.clone(),
            shipping_address: self.shipping_address.clone(),
            packaging: self.packaging.clone(),
            customs: self.customs.clone(),
            carrier: self.carrier.clone(),
            payment: self.payment.clone(),
            ..Data::default()
        }
    }

    pub fn repository(&self) -> InMemoryLabelRepository {
        InMemoryLabelRepository::new().with_order(self.order_id(), self.initial_data())
    }

    pub fn validator(&self) -> FixtureAddressValidator {
        FixtureAddressValidator::new(self.validation.clone())
            .with_latency(Duration::from_millis(self.latency_ms))
    }
}

/// Validator answering from a fixed rule list; unknown addresses are valid
#[derive(Debug, Clone, Default)]
pub struct FixtureAddressValidator {
    rules: Vec<ValidationRule>,
    latency: Duration,
}

impl FixtureAddressValidator {
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        Self {
            rules,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl AddressValidator for FixtureAddressValidator {
    async fn validate(&self, address: &Address) -> Result<ValidationResult, ValidationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let outcome = self
            .rules
            .iter()
            .find(|rule| rule.address == *address)
            .map(|rule| rule.outcome.clone())
            .unwrap_or(FixtureOutcome::Valid);

        match outcome {
            FixtureOutcome::Valid => Ok(ValidationResult::Valid(address.clone())),
            FixtureOutcome::Suggested { suggested } => Ok(ValidationResult::Suggested {
                original: address.clone(),
                suggested,
            }),
            FixtureOutcome::Invalid { reason } => Ok(ValidationResult::Invalid { reason }),
            FixtureOutcome::TransportFailure { message } => Err(ValidationError::Transport(message)),
            FixtureOutcome::Hang => std::future::pending().await,
        }
    }
}
