//! Multi-step shipping label creation workflow.
//!
//! A pure reducer ([`state_machine::reduce`]) owns the label [`Data`] and
//! turns user gestures and validation verdicts into [`SideEffect`]s. The
//! [`EffectDispatcher`] runs address validation concurrently and feeds
//! verdicts back as events; [`LabelCreationSession`] wires the two together.

pub mod data;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod fixture;
pub mod registry;
pub mod repository;
pub mod session;
pub mod state_machine;
pub mod suggestion;
pub mod traits;
pub mod types;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use data::{Data, PendingSuggestion, PendingValidation};
pub use dispatcher::EffectDispatcher;
pub use errors::{RepositoryError, SessionError, ValidationError};
pub use events::{Event, SideEffect};
pub use fixture::{FixtureAddressValidator, FixtureOutcome, LabelFixture, ValidationRule};
pub use registry::StepRegistry;
pub use repository::{InMemoryLabelRepository, OrderId};
pub use session::{LabelCreationSession, SessionHandle, SessionOptions};
pub use state_machine::{reduce, ShippingLabelsStateMachine, Transition};
pub use suggestion::{AddressSuggestion, SuggestionChoice};
pub use traits::{AddressValidator, LabelRepository};
pub use types::*;
pub use view::{StepView, ViewState};
