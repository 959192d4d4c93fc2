// Address suggestion screen: the user keeps either the entered address or the
// validator's correction.

use serde::{Deserialize, Serialize};
use statig::prelude::*;
use tracing::{debug, info};

use crate::shipping_label::events::Event;
use crate::shipping_label::types::{Address, FlowStep};

/// Choices available on the address suggestion screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionChoice {
    SelectEntered,
    SelectSuggested,
    UseSelected,
    EditSelected,
}

/// Two-way reconciliation between the address the user entered and the one
/// proposed by the validator. The user picks exactly one of them; the two are
/// never merged.
#[derive(Debug, Clone)]
pub struct AddressSuggestion {
    step: FlowStep,
    entered: Address,
    suggested: Address,
    selected: Option<Address>,
    resolution: Option<Event>,
}

impl AddressSuggestion {
    pub fn new(step: FlowStep, entered: Address, suggested: Address) -> Self {
        Self {
            step,
            entered,
            suggested,
            selected: None,
            resolution: None,
        }
    }

    fn select(&mut self, choice: SuggestionChoice) {
        let address = match choice {
            SuggestionChoice::SelectSuggested => &self.suggested,
            _ => &self.entered,
        };
        self.selected = Some(address.clone());
    }

    fn resolve(&mut self, choice: SuggestionChoice) {
        let Some(address) = self.selected.clone() else {
            return;
        };
        let step = self.step;
        self.resolution = Some(match choice {
            SuggestionChoice::EditSelected => Event::SuggestionEditRequested { step, address },
            _ => Event::SuggestionAccepted { step, address },
        });
        info!(
            step = %step,
            choice = ?choice,
            "Address suggestion resolved"
        );
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn entered(&self) -> &Address {
        &self.entered
    }

    pub fn suggested(&self) -> &Address {
        &self.suggested
    }

    pub fn selected(&self) -> Option<&Address> {
        self.selected.as_ref()
    }

    /// "Use" and "edit" are only offered once something is selected
    pub fn are_buttons_enabled(&self) -> bool {
        self.selected.is_some() && self.resolution.is_none()
    }

    pub fn is_suggested_selected(&self) -> bool {
        self.selected.as_ref() == Some(&self.suggested)
    }

    /// Event to feed back into the workflow once the user has decided
    pub fn resolution(&self) -> Option<&Event> {
        self.resolution.as_ref()
    }

    pub fn title(&self) -> &'static str {
        match self.step {
            FlowStep::OriginAddress => "Ship from",
            _ => "Ship to",
        }
    }
}

#[state_machine(initial = "State::awaiting_selection()")]
impl AddressSuggestion {
    #[state]
    fn awaiting_selection(&mut self, event: &SuggestionChoice) -> Outcome<State> {
        match event {
            SuggestionChoice::SelectEntered | SuggestionChoice::SelectSuggested => {
                self.select(*event);
                Transition(State::choice_made())
            }
            // Buttons are disabled until a choice is made
            SuggestionChoice::UseSelected | SuggestionChoice::EditSelected => Handled,
        }
    }

    #[state]
    fn choice_made(&mut self, event: &SuggestionChoice) -> Outcome<State> {
        match event {
            SuggestionChoice::SelectEntered | SuggestionChoice::SelectSuggested => {
                self.select(*event);
                Handled
            }
            SuggestionChoice::UseSelected | SuggestionChoice::EditSelected => {
                self.resolve(*event);
                Transition(State::resolved())
            }
        }
    }

    #[state]
    fn resolved(&mut self, event: &SuggestionChoice) -> Outcome<State> {
        debug!(choice = ?event, "Ignoring choice on resolved suggestion");
        Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entered() -> Address {
        Address {
            address1: "742 Evergreen Terr".to_string(),
            city: "Springfield".to_string(),
            ..Default::default()
        }
    }

    fn suggested() -> Address {
        Address {
            address1: "742 Evergreen Terrace".to_string(),
            city: "Springfield".to_string(),
            postcode: "97475".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_buttons_disabled_until_selection() {
        let mut sm =
            AddressSuggestion::new(FlowStep::OriginAddress, entered(), suggested()).state_machine();

        assert!(!sm.inner().are_buttons_enabled());
        sm.handle(&SuggestionChoice::UseSelected);
        sm.handle(&SuggestionChoice::EditSelected);

        assert!(sm.inner().resolution().is_none());
        assert!(sm.inner().selected().is_none());
    }

    #[test]
    fn test_selection_is_mutually_exclusive() {
        let mut sm =
            AddressSuggestion::new(FlowStep::ShippingAddress, entered(), suggested()).state_machine();

        sm.handle(&SuggestionChoice::SelectSuggested);
        assert!(sm.inner().is_suggested_selected());
        assert!(sm.inner().are_buttons_enabled());

        sm.handle(&SuggestionChoice::SelectEntered);
        assert!(!sm.inner().is_suggested_selected());
        assert_eq!(sm.inner().selected(), Some(&entered()));
    }

    #[test]
    fn test_use_selected_accepts_chosen_address() {
        let mut sm =
            AddressSuggestion::new(FlowStep::OriginAddress, entered(), suggested()).state_machine();

        sm.handle(&SuggestionChoice::SelectSuggested);
        sm.handle(&SuggestionChoice::UseSelected);

        assert_eq!(
            sm.inner().resolution(),
            Some(&Event::SuggestionAccepted {
                step: FlowStep::OriginAddress,
                address: suggested(),
            })
        );
        assert!(!sm.inner().are_buttons_enabled());
    }

    #[test]
    fn test_edit_selected_requests_editor() {
        let mut sm =
            AddressSuggestion::new(FlowStep::ShippingAddress, entered(), suggested()).state_machine();

        sm.handle(&SuggestionChoice::SelectEntered);
        sm.handle(&SuggestionChoice::EditSelected);

        assert_eq!(
            sm.inner().resolution(),
            Some(&Event::SuggestionEditRequested {
                step: FlowStep::ShippingAddress,
                address: entered(),
            })
        );
    }

    #[test]
    fn test_resolved_suggestion_ignores_further_input() {
        let mut sm =
            AddressSuggestion::new(FlowStep::OriginAddress, entered(), suggested()).state_machine();

        sm.handle(&SuggestionChoice::SelectEntered);
        sm.handle(&SuggestionChoice::UseSelected);
        sm.handle(&SuggestionChoice::SelectSuggested);
        sm.handle(&SuggestionChoice::EditSelected);

        assert_eq!(sm.inner().selected(), Some(&entered()));
        assert!(matches!(
            sm.inner().resolution(),
            Some(Event::SuggestionAccepted { .. })
        ));
    }

    #[test]
    fn test_title_depends_on_step() {
        let origin = AddressSuggestion::new(FlowStep::OriginAddress, entered(), suggested());
        let shipping = AddressSuggestion::new(FlowStep::ShippingAddress, entered(), suggested());
        assert_eq!(origin.title(), "Ship from");
        assert_eq!(shipping.title(), "Ship to");
    }
}
