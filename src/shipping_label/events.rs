// Messages flowing into and out of the workflow state machine

use serde::{Deserialize, Serialize};

use crate::shipping_label::data::Data;
use crate::shipping_label::types::*;

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // User gestures
    ContinueTapped {
        step: FlowStep,
    },
    EditTapped {
        step: FlowStep,
    },
    AddressEditConfirmed {
        step: FlowStep,
        address: Address,
    },
    AddressEditCanceled {
        step: FlowStep,
    },
    /// Address picked on the suggestion screen, used as-is
    SuggestionAccepted {
        step: FlowStep,
        address: Address,
    },
    /// Address picked on the suggestion screen, to be edited before use
    SuggestionEditRequested {
        step: FlowStep,
        address: Address,
    },
    /// Package, customs, carrier or payment data entered for a step
    DetailsEntered {
        step: FlowStep,
        details: StepDetails,
    },

    // Raised by the effect dispatcher
    ValidationStarted {
        step: FlowStep,
        request: RequestId,
    },
    ValidationCompleted {
        step: FlowStep,
        request: RequestId,
        result: ValidationResult,
    },
}

impl Event {
    pub fn step(&self) -> FlowStep {
        match self {
            Event::ContinueTapped { step }
            | Event::EditTapped { step }
            | Event::AddressEditConfirmed { step, .. }
            | Event::AddressEditCanceled { step }
            | Event::SuggestionAccepted { step, .. }
            | Event::SuggestionEditRequested { step, .. }
            | Event::DetailsEntered { step, .. }
            | Event::ValidationStarted { step, .. }
            | Event::ValidationCompleted { step, .. } => *step,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::ContinueTapped { .. } => "continue_tapped",
            Event::EditTapped { .. } => "edit_tapped",
            Event::AddressEditConfirmed { .. } => "address_edit_confirmed",
            Event::AddressEditCanceled { .. } => "address_edit_canceled",
            Event::SuggestionAccepted { .. } => "suggestion_accepted",
            Event::SuggestionEditRequested { .. } => "suggestion_edit_requested",
            Event::DetailsEntered { .. } => "details_entered",
            Event::ValidationStarted { .. } => "validation_started",
            Event::ValidationCompleted { .. } => "validation_completed",
        }
    }
}

/// Instructions emitted by the state machine for work outside the transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Render the given snapshot
    UpdateViewState(Data),
    /// Ask the dispatcher to run the address validator
    ValidateAddress {
        step: FlowStep,
        address: Address,
        request: RequestId,
    },
    ShowSuggestedAddress {
        step: FlowStep,
        original: Address,
        suggested: Address,
    },
    OpenAddressEditor {
        step: FlowStep,
        address: Address,
    },
    NoOp,
}

impl SideEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SideEffect::UpdateViewState(_) => "update_view_state",
            SideEffect::ValidateAddress { .. } => "validate_address",
            SideEffect::ShowSuggestedAddress { .. } => "show_suggested_address",
            SideEffect::OpenAddressEditor { .. } => "open_address_editor",
            SideEffect::NoOp => "no_op",
        }
    }
}
