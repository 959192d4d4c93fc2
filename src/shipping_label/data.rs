// Accumulated workflow state owned by the state machine

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::shipping_label::registry::StepRegistry;
use crate::shipping_label::types::*;

/// Validation that has been requested but whose verdict has not been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingValidation {
    pub step: FlowStep,
    pub request: RequestId,
    /// Set once the dispatcher reports the remote call is under way
    pub started: bool,
}

/// Suggestion offered for an address step and not yet settled by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSuggestion {
    pub step: FlowStep,
    pub original: Address,
    pub suggested: Address,
}

impl PendingSuggestion {
    /// Only the two offered addresses can settle a suggestion; never a mix
    pub fn offers(&self, address: &Address) -> bool {
        *address == self.original || *address == self.suggested
    }
}

/// Snapshot of the label creation workflow.
///
/// Each transition produces a new `Data`; snapshots handed to the dispatcher
/// and the presentation layer are never written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub origin_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub packaging: Option<PackageSelection>,
    pub customs: Option<CustomsDeclaration>,
    pub carrier: Option<CarrierSelection>,
    pub payment: Option<PaymentSelection>,
    pub completed_steps: BTreeSet<FlowStep>,
    pub current_step: FlowStep,
    #[serde(default)]
    pub pending_validation: Option<PendingValidation>,
    #[serde(default)]
    pub pending_suggestion: Option<PendingSuggestion>,
    #[serde(default)]
    pub step_errors: BTreeMap<FlowStep, String>,
    #[serde(default)]
    pub next_request: RequestId,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            origin_address: None,
            shipping_address: None,
            packaging: None,
            customs: None,
            carrier: None,
            payment: None,
            completed_steps: BTreeSet::new(),
            current_step: FlowStep::OriginAddress,
            pending_validation: None,
            pending_suggestion: None,
            step_errors: BTreeMap::new(),
            next_request: RequestId::default(),
        }
    }
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin_address(mut self, address: Address) -> Self {
        self.origin_address = Some(address);
        self
    }

    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn with_details(mut self, details: StepDetails) -> Self {
        self.set_details(details);
        self
    }

    pub fn with_completed_steps(mut self, steps: impl IntoIterator<Item = FlowStep>) -> Self {
        self.completed_steps.extend(steps);
        self
    }

    /// Bring a snapshot from an outside source in line with the registry:
    /// completed steps become a gap-free prefix of the enabled steps, the
    /// current step is recomputed and in-flight bookkeeping is dropped.
    pub fn normalized(mut self, registry: &StepRegistry) -> Self {
        self.completed_steps = registry.completed_prefix(&self.completed_steps);
        self.current_step = registry.current_step(&self.completed_steps);
        self.pending_validation = None;
        self.pending_suggestion = None;
        self.step_errors.retain(|step, _| registry.is_enabled(*step));
        self
    }

    pub fn is_completed(&self, step: FlowStep) -> bool {
        self.completed_steps.contains(&step)
    }

    /// A step can be edited once it is completed or while it is current
    pub fn is_editable(&self, step: FlowStep) -> bool {
        self.is_completed(step) || self.current_step == step
    }

    pub fn is_validating(&self) -> bool {
        self.pending_validation.is_some()
    }

    pub fn is_validating_step(&self, step: FlowStep) -> bool {
        self.pending_validation.is_some_and(|pending| pending.step == step)
    }

    pub fn pending_suggestion_for(&self, step: FlowStep) -> Option<&PendingSuggestion> {
        self.pending_suggestion
            .as_ref()
            .filter(|pending| pending.step == step)
    }

    pub fn is_complete(&self, registry: &StepRegistry) -> bool {
        registry.all_completed(&self.completed_steps)
    }

    /// Most recent validation request handed out, if any
    pub fn last_issued_request(&self) -> Option<RequestId> {
        self.next_request.0.checked_sub(1).map(RequestId)
    }

    pub fn address(&self, step: FlowStep) -> Option<&Address> {
        match step {
            FlowStep::OriginAddress => self.origin_address.as_ref(),
            FlowStep::ShippingAddress => self.shipping_address.as_ref(),
            _ => None,
        }
    }

    pub fn set_address(&mut self, step: FlowStep, address: Address) {
        match step {
            FlowStep::OriginAddress => self.origin_address = Some(address),
            FlowStep::ShippingAddress => self.shipping_address = Some(address),
            _ => {}
        }
    }

    pub fn details(&self, step: FlowStep) -> Option<StepDetails> {
        match step {
            FlowStep::Packaging => self.packaging.clone().map(StepDetails::Packaging),
            FlowStep::Customs => self.customs.clone().map(StepDetails::Customs),
            FlowStep::Carrier => self.carrier.clone().map(StepDetails::Carrier),
            FlowStep::Payment => self.payment.clone().map(StepDetails::Payment),
            FlowStep::OriginAddress | FlowStep::ShippingAddress => None,
        }
    }

    pub fn set_details(&mut self, details: StepDetails) {
        match details {
            StepDetails::Packaging(package) => self.packaging = Some(package),
            StepDetails::Customs(customs) => self.customs = Some(customs),
            StepDetails::Carrier(carrier) => self.carrier = Some(carrier),
            StepDetails::Payment(payment) => self.payment = Some(payment),
        }
    }

    pub fn has_payload(&self, step: FlowStep) -> bool {
        match step.kind() {
            StepKind::Address => self.address(step).is_some(),
            StepKind::Details => self.details(step).is_some(),
        }
    }

    /// Human readable summary shown on the step card
    pub fn details_text(&self, step: FlowStep) -> String {
        match step.kind() {
            StepKind::Address => self.address(step).map(|a| a.to_string()),
            StepKind::Details => self.details(step).map(|d| d.to_string()),
        }
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn springfield() -> Address {
        Address {
            city: "Springfield".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_data_starts_at_origin() {
        let data = Data::new();
        assert_eq!(data.current_step, FlowStep::OriginAddress);
        assert!(data.completed_steps.is_empty());
        assert!(!data.has_payload(FlowStep::OriginAddress));
        assert_eq!(data.last_issued_request(), None);
    }

    #[test]
    fn test_normalization_repairs_loaded_snapshot() {
        let registry = StepRegistry::default();
        let mut data = Data::new()
            .with_origin_address(springfield())
            .with_completed_steps([FlowStep::OriginAddress, FlowStep::Customs]);
        data.current_step = FlowStep::Payment;
        data.pending_validation = Some(PendingValidation {
            step: FlowStep::ShippingAddress,
            request: RequestId(4),
            started: true,
        });

        let data = data.normalized(&registry);
        assert_eq!(
            data.completed_steps,
            [FlowStep::OriginAddress].into_iter().collect()
        );
        assert_eq!(data.current_step, FlowStep::ShippingAddress);
        assert!(data.pending_validation.is_none());
    }

    #[test]
    fn test_pending_suggestion_offers_only_its_two_addresses() {
        let suggested = Address {
            postcode: "97475".to_string(),
            ..springfield()
        };
        let mut data = Data::new();
        data.pending_suggestion = Some(PendingSuggestion {
            step: FlowStep::OriginAddress,
            original: springfield(),
            suggested: suggested.clone(),
        });

        let pending = data.pending_suggestion_for(FlowStep::OriginAddress).unwrap();
        assert!(pending.offers(&springfield()));
        assert!(pending.offers(&suggested));
        assert!(!pending.offers(&Address {
            address1: "1 Main St".to_string(),
            ..suggested
        }));
        assert!(data.pending_suggestion_for(FlowStep::ShippingAddress).is_none());

        let data = data.normalized(&StepRegistry::default());
        assert!(data.pending_suggestion.is_none());
    }

    #[test]
    fn test_payload_accessors() {
        let mut data = Data::new().with_details(StepDetails::Packaging(PackageSelection {
            package_id: "small-box".to_string(),
            weight_grams: 900,
        }));
        data.set_address(FlowStep::ShippingAddress, springfield());

        assert!(data.has_payload(FlowStep::Packaging));
        assert!(data.has_payload(FlowStep::ShippingAddress));
        assert!(!data.has_payload(FlowStep::Carrier));
        assert_eq!(data.details_text(FlowStep::Packaging), "small-box (900 g)");
        assert_eq!(data.details_text(FlowStep::ShippingAddress), "Springfield");
        assert_eq!(data.details_text(FlowStep::Payment), "");
    }

    #[test]
    fn test_editable_steps() {
        let data = Data::new()
            .with_completed_steps([FlowStep::OriginAddress])
            .normalized(&StepRegistry::default());

        assert!(data.is_editable(FlowStep::OriginAddress));
        assert!(data.is_editable(FlowStep::ShippingAddress));
        assert!(!data.is_editable(FlowStep::Packaging));
    }
}
