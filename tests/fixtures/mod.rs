//! Shared helpers for session-level tests
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use label_flow::shipping_label::{
    Address, AddressValidator, CarrierSelection, CustomsDeclaration, CustomsItem, Data,
    InMemoryLabelRepository, LabelCreationSession, OrderId, PackageSelection, PaymentSelection,
    SessionHandle, SessionOptions, SideEffect, StepDetails, StepRegistry,
};

#[cfg(feature = "testing")]
pub use label_flow::shipping_label::mocks::GatedValidator;

pub const ORDER: OrderId = OrderId(123);

pub fn springfield() -> Address {
    Address {
        first_name: "Homer".to_string(),
        last_name: "Simpson".to_string(),
        address1: "742 Evergreen Terrace".to_string(),
        city: "Springfield".to_string(),
        state: "OR".to_string(),
        country: "US".to_string(),
        ..Default::default()
    }
}

pub fn springfield_corrected() -> Address {
    Address {
        postcode: "97475".to_string(),
        ..springfield()
    }
}

pub fn shelbyville() -> Address {
    Address {
        company: "Kwik-E-Mart".to_string(),
        address1: "1 Main Street".to_string(),
        city: "Shelbyville".to_string(),
        state: "OR".to_string(),
        country: "US".to_string(),
        ..Default::default()
    }
}

pub fn all_details() -> Vec<StepDetails> {
    vec![
        StepDetails::Packaging(PackageSelection {
            package_id: "small-flat-rate-box".to_string(),
            weight_grams: 900,
        }),
        StepDetails::Customs(CustomsDeclaration {
            contents_type: "merchandise".to_string(),
            items: vec![CustomsItem {
                description: "Donut".to_string(),
                quantity: 12,
                value_cents: 1200,
            }],
        }),
        StepDetails::Carrier(CarrierSelection {
            carrier_id: "usps".to_string(),
            service_id: "priority".to_string(),
            rate_cents: 895,
        }),
        StepDetails::Payment(PaymentSelection {
            method_id: "card-1".to_string(),
            description: "Visa ending in 4242".to_string(),
        }),
    ]
}

/// Order with both addresses on file and every detail step filled in
pub fn prefilled_order() -> Data {
    all_details().into_iter().fold(
        Data::new()
            .with_origin_address(springfield())
            .with_shipping_address(shelbyville()),
        Data::with_details,
    )
}

pub fn options(include_unfinished_steps: bool, timeout: Duration) -> SessionOptions {
    SessionOptions {
        registry: StepRegistry::new(include_unfinished_steps),
        validation_timeout: timeout,
    }
}

pub async fn start_session(
    data: Data,
    validator: Arc<dyn AddressValidator>,
    options: SessionOptions,
) -> (SessionHandle, mpsc::UnboundedReceiver<SideEffect>) {
    let repository = InMemoryLabelRepository::new().with_order(ORDER, data);
    LabelCreationSession::start(ORDER, &repository, validator, options)
        .await
        .expect("session should start")
}

/// Next presentation effect, failing the test instead of hanging
pub async fn next_effect(presentation: &mut mpsc::UnboundedReceiver<SideEffect>) -> SideEffect {
    tokio::time::timeout(Duration::from_secs(5), presentation.recv())
        .await
        .expect("timed out waiting for a presentation effect")
        .expect("presentation channel closed")
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Gated validator ready to hand to `start_session`
#[cfg(feature = "testing")]
pub fn gated_validator() -> Arc<GatedValidator> {
    Arc::new(GatedValidator::new())
}
