// Shipping label workflow state machine
//
// Pure reducer over (Data, Event); the wrapper only swaps in the new Data and
// logs the transition. Async work is described by the returned side effects.

use tracing::{debug, info};

use crate::shipping_label::data::{Data, PendingSuggestion, PendingValidation};
use crate::shipping_label::events::{Event, SideEffect};
use crate::shipping_label::registry::StepRegistry;
use crate::shipping_label::types::*;

/// Outcome of applying one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub data: Data,
    pub effects: Vec<SideEffect>,
    /// Why the event was dropped, when it was
    pub ignored: Option<&'static str>,
}

impl Transition {
    fn applied(data: Data, effects: Vec<SideEffect>) -> Self {
        Self {
            data,
            effects,
            ignored: None,
        }
    }

    fn ignored(data: &Data, reason: &'static str) -> Self {
        Self {
            data: data.clone(),
            effects: Vec::new(),
            ignored: Some(reason),
        }
    }

    fn render(data: Data) -> Self {
        let effects = vec![SideEffect::UpdateViewState(data.clone())];
        Self::applied(data, effects)
    }
}

/// Compute the next state and side effects for `event`
pub fn reduce(registry: &StepRegistry, data: &Data, event: &Event) -> Transition {
    let step = event.step();
    if !registry.is_enabled(step) {
        return Transition::ignored(data, "step is not enabled");
    }

    match event {
        Event::ContinueTapped { step } => continue_tapped(registry, data, *step),
        Event::EditTapped { step } => edit_tapped(data, *step),
        Event::AddressEditConfirmed { step, address } => {
            address_edit_confirmed(registry, data, *step, address)
        }
        Event::AddressEditCanceled { step } => {
            if !data.is_editable(*step) {
                return Transition::ignored(data, "step is not editable");
            }
            Transition::render(data.clone())
        }
        Event::SuggestionAccepted { step, address } => {
            suggestion_accepted(registry, data, *step, address)
        }
        Event::SuggestionEditRequested { step, address } => {
            if let Some(reason) = unsettled_suggestion(data, *step, address) {
                return Transition::ignored(data, reason);
            }
            let mut next = data.clone();
            next.pending_suggestion = None;
            Transition::applied(
                next,
                vec![SideEffect::OpenAddressEditor {
                    step: *step,
                    address: address.clone(),
                }],
            )
        }
        Event::DetailsEntered { step, details } => details_entered(registry, data, *step, details),
        Event::ValidationStarted { step, request } => validation_started(data, *step, *request),
        Event::ValidationCompleted {
            step,
            request,
            result,
        } => validation_completed(registry, data, *step, *request, result),
    }
}

fn continue_tapped(registry: &StepRegistry, data: &Data, step: FlowStep) -> Transition {
    if step != data.current_step || data.is_completed(step) {
        return Transition::ignored(data, "step is not the current step");
    }
    if data.is_validating() {
        return Transition::ignored(data, "validation already in progress");
    }

    match step.kind() {
        StepKind::Address => match data.address(step) {
            Some(address) => request_validation(data.clone(), step, address.clone()),
            None => Transition::applied(
                data.clone(),
                vec![SideEffect::OpenAddressEditor {
                    step,
                    address: Address::default(),
                }],
            ),
        },
        StepKind::Details => Transition::render(complete_step(registry, data.clone(), step)),
    }
}

fn edit_tapped(data: &Data, step: FlowStep) -> Transition {
    if !data.is_editable(step) {
        return Transition::ignored(data, "step is not editable");
    }

    match step.kind() {
        StepKind::Address => {
            let address = data.address(step).cloned().unwrap_or_default();
            Transition::applied(
                data.clone(),
                vec![SideEffect::OpenAddressEditor { step, address }],
            )
        }
        // Detail editors live outside the engine and report back with DetailsEntered
        StepKind::Details => Transition::applied(data.clone(), vec![SideEffect::NoOp]),
    }
}

fn address_edit_confirmed(
    registry: &StepRegistry,
    data: &Data,
    step: FlowStep,
    address: &Address,
) -> Transition {
    if !step.is_address_step() || !data.is_editable(step) {
        return Transition::ignored(data, "step is not an editable address step");
    }

    let next = invalidate_from(registry, data.clone(), step);
    request_validation(next, step, address.clone())
}

fn suggestion_accepted(
    registry: &StepRegistry,
    data: &Data,
    step: FlowStep,
    address: &Address,
) -> Transition {
    if let Some(reason) = unsettled_suggestion(data, step, address) {
        return Transition::ignored(data, reason);
    }

    let mut next = data.clone();
    next.pending_validation = None;
    next.pending_suggestion = None;
    next.set_address(step, address.clone());
    Transition::render(complete_step(registry, next, step))
}

/// Why a choice made on the suggestion screen cannot be applied, if it can't
fn unsettled_suggestion(data: &Data, step: FlowStep, address: &Address) -> Option<&'static str> {
    if step != data.current_step || data.is_completed(step) {
        return Some("suggestion does not belong to the current step");
    }
    match data.pending_suggestion_for(step) {
        None => Some("no suggestion is pending for the step"),
        Some(pending) if !pending.offers(address) => {
            Some("address is neither the entered nor the suggested one")
        }
        Some(_) => None,
    }
}

fn details_entered(
    registry: &StepRegistry,
    data: &Data,
    step: FlowStep,
    details: &StepDetails,
) -> Transition {
    if details.step() != step || !data.is_editable(step) {
        return Transition::ignored(data, "details do not match an editable step");
    }

    let mut next = if data.is_completed(step) {
        invalidate_from(registry, data.clone(), step)
    } else {
        data.clone()
    };
    next.set_details(details.clone());
    Transition::render(next)
}

fn validation_started(data: &Data, step: FlowStep, request: RequestId) -> Transition {
    match data.pending_validation {
        Some(pending) if pending.step == step && pending.request == request && !pending.started => {
            let mut next = data.clone();
            next.pending_validation = Some(PendingValidation {
                started: true,
                ..pending
            });
            Transition::render(next)
        }
        _ => Transition::ignored(data, "no matching validation pending"),
    }
}

fn validation_completed(
    registry: &StepRegistry,
    data: &Data,
    step: FlowStep,
    request: RequestId,
    result: &ValidationResult,
) -> Transition {
    if step != data.current_step || data.is_completed(step) || !step.is_address_step() {
        return Transition::ignored(data, "verdict does not belong to the current step");
    }
    if data.last_issued_request().is_some_and(|latest| latest != request) {
        return Transition::ignored(data, "verdict is for a superseded request");
    }

    let mut next = data.clone();
    next.pending_validation = None;
    next.pending_suggestion = None;

    match result {
        ValidationResult::Valid(address) => {
            next.set_address(step, address.clone());
            Transition::render(complete_step(registry, next, step))
        }
        ValidationResult::Suggested {
            original,
            suggested,
        } => {
            next.step_errors.remove(&step);
            next.pending_suggestion = Some(PendingSuggestion {
                step,
                original: original.clone(),
                suggested: suggested.clone(),
            });
            Transition::applied(
                next.clone(),
                vec![
                    SideEffect::UpdateViewState(next),
                    SideEffect::ShowSuggestedAddress {
                        step,
                        original: original.clone(),
                        suggested: suggested.clone(),
                    },
                ],
            )
        }
        ValidationResult::Invalid { reason } => {
            next.step_errors.insert(step, reason.clone());
            Transition::render(next)
        }
    }
}

/// Record the step's address and ask the dispatcher to validate it
fn request_validation(mut data: Data, step: FlowStep, address: Address) -> Transition {
    let request = data.next_request;
    data.next_request = request.next();
    data.pending_validation = Some(PendingValidation {
        step,
        request,
        started: false,
    });
    data.pending_suggestion = None;
    data.step_errors.remove(&step);
    data.set_address(step, address.clone());

    Transition::applied(
        data,
        vec![SideEffect::ValidateAddress {
            step,
            address,
            request,
        }],
    )
}

fn complete_step(registry: &StepRegistry, mut data: Data, step: FlowStep) -> Data {
    data.step_errors.remove(&step);
    data.pending_suggestion = None;
    data.completed_steps.insert(step);
    data.completed_steps = registry.completed_prefix(&data.completed_steps);
    data.current_step = registry.current_step(&data.completed_steps);
    data
}

/// Drop completion of `step` and everything after it; `step` becomes current
fn invalidate_from(registry: &StepRegistry, mut data: Data, step: FlowStep) -> Data {
    data.completed_steps.retain(|completed| *completed < step);
    data.step_errors.retain(|errored, _| *errored < step);
    data.pending_validation = None;
    data.pending_suggestion = None;
    data.current_step = registry.current_step(&data.completed_steps);
    data
}

/// Owner of the single live `Data` of a label creation session
#[derive(Debug, Clone)]
pub struct ShippingLabelsStateMachine {
    registry: StepRegistry,
    data: Data,
}

impl ShippingLabelsStateMachine {
    pub fn new(registry: StepRegistry) -> Self {
        Self::with_data(registry, Data::new())
    }

    /// Start from a loaded snapshot, normalized against the registry
    pub fn with_data(registry: StepRegistry, initial: Data) -> Self {
        let data = initial.normalized(&registry);
        Self { registry, data }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn current_data(&self) -> &Data {
        &self.data
    }

    /// Apply one event and return the side effects it produced
    pub fn handle_event(&mut self, event: &Event) -> Vec<SideEffect> {
        let transition = reduce(&self.registry, &self.data, event);

        if let Some(reason) = transition.ignored {
            debug!(
                event = event.name(),
                step = %event.step(),
                current_step = %self.data.current_step,
                reason,
                "Ignoring shipping label event"
            );
            return transition.effects;
        }

        info!(
            event = event.name(),
            step = %event.step(),
            from_step = %self.data.current_step,
            to_step = %transition.data.current_step,
            completed = ?transition.data.completed_steps,
            effects = ?transition.effects.iter().map(SideEffect::name).collect::<Vec<_>>(),
            "Shipping label workflow transition"
        );

        self.data = transition.data;
        transition.effects
    }

    pub fn is_complete(&self) -> bool {
        self.data.is_complete(&self.registry)
    }
}
