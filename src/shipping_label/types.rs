// Core types for the shipping label creation workflow

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of the label creation flow, in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    OriginAddress,
    ShippingAddress,
    Packaging,
    Customs,
    Carrier,
    Payment,
}

impl FlowStep {
    pub const ALL: [FlowStep; 6] = [
        FlowStep::OriginAddress,
        FlowStep::ShippingAddress,
        FlowStep::Packaging,
        FlowStep::Customs,
        FlowStep::Carrier,
        FlowStep::Payment,
    ];

    /// Kind of payload this step produces
    pub fn kind(self) -> StepKind {
        match self {
            FlowStep::OriginAddress | FlowStep::ShippingAddress => StepKind::Address,
            FlowStep::Packaging | FlowStep::Customs | FlowStep::Carrier | FlowStep::Payment => {
                StepKind::Details
            }
        }
    }

    pub fn is_address_step(self) -> bool {
        self.kind() == StepKind::Address
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowStep::OriginAddress => "origin_address",
            FlowStep::ShippingAddress => "shipping_address",
            FlowStep::Packaging => "packaging",
            FlowStep::Customs => "customs",
            FlowStep::Carrier => "carrier",
            FlowStep::Payment => "payment",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload kind produced by a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Origin and shipping addresses, checked by the address validator
    Address,
    /// Package, customs, carrier and payment selections
    Details,
}

/// Structured mailing address
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub phone: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        *self == Address::default()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = format!("{} {}", self.state, self.postcode).trim().to_string();
        let city_line = match (self.city.is_empty(), region.is_empty()) {
            (false, false) => format!("{}, {}", self.city, region),
            (false, true) => self.city.clone(),
            (true, _) => region,
        };

        let lines = [
            self.full_name(),
            self.company.clone(),
            self.address1.clone(),
            self.address2.clone(),
            city_line,
            self.country.clone(),
        ];

        let rendered: Vec<&str> = lines
            .iter()
            .map(|line| line.as_str())
            .filter(|line| !line.is_empty())
            .collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

/// Selected package for the shipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSelection {
    pub package_id: String,
    pub weight_grams: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomsItem {
    pub description: String,
    pub quantity: u32,
    pub value_cents: u64,
}

/// Customs form for international shipments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomsDeclaration {
    pub contents_type: String,
    #[serde(default)]
    pub items: Vec<CustomsItem>,
}

/// Chosen carrier service and its quoted rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierSelection {
    pub carrier_id: String,
    pub service_id: String,
    pub rate_cents: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method_id: String,
    pub description: String,
}

/// Payload of a non-address step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepDetails {
    Packaging(PackageSelection),
    Customs(CustomsDeclaration),
    Carrier(CarrierSelection),
    Payment(PaymentSelection),
}

impl StepDetails {
    /// The step this payload belongs to
    pub fn step(&self) -> FlowStep {
        match self {
            StepDetails::Packaging(_) => FlowStep::Packaging,
            StepDetails::Customs(_) => FlowStep::Customs,
            StepDetails::Carrier(_) => FlowStep::Carrier,
            StepDetails::Payment(_) => FlowStep::Payment,
        }
    }
}

impl fmt::Display for StepDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDetails::Packaging(package) => {
                write!(f, "{} ({} g)", package.package_id, package.weight_grams)
            }
            StepDetails::Customs(customs) => {
                write!(f, "{}, {} item(s)", customs.contents_type, customs.items.len())
            }
            StepDetails::Carrier(carrier) => write!(
                f,
                "{} {} - {}.{:02}",
                carrier.carrier_id,
                carrier.service_id,
                carrier.rate_cents / 100,
                carrier.rate_cents % 100
            ),
            StepDetails::Payment(payment) => f.write_str(&payment.description),
        }
    }
}

/// Sequence number of a validation request, allocated by the state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> RequestId {
        RequestId(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Verdict of one address validation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    /// Exact match; carries the normalized address
    Valid(Address),
    /// The service proposes a correction the user must resolve
    Suggested { original: Address, suggested: Address },
    Invalid { reason: String },
}

impl ValidationResult {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            reason: reason.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValidationResult::Valid(_) => "valid",
            ValidationResult::Suggested { .. } => "suggested",
            ValidationResult::Invalid { .. } => "invalid",
        }
    }
}
