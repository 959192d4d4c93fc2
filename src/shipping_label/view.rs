// View records derived from workflow data for the presentation layer

use serde::Serialize;

use crate::shipping_label::data::Data;
use crate::shipping_label::registry::StepRegistry;
use crate::shipping_label::types::FlowStep;

/// Render state of one step card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub step: FlowStep,
    pub details: String,
    pub is_enabled: bool,
    pub is_continue_button_visible: bool,
    pub is_edit_button_visible: bool,
    pub is_highlighted: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub steps: Vec<StepView>,
    /// A validation call is running for the current step
    pub is_progress_visible: bool,
    pub is_complete: bool,
}

impl ViewState {
    /// Pure function of the snapshot; recomputed on every view update
    pub fn derive(data: &Data, registry: &StepRegistry) -> Self {
        let steps = FlowStep::ALL
            .iter()
            .map(|step| derive_step(data, registry, *step))
            .collect();

        Self {
            steps,
            is_progress_visible: data.pending_validation.is_some_and(|pending| pending.started),
            is_complete: data.is_complete(registry),
        }
    }

    pub fn step(&self, step: FlowStep) -> Option<&StepView> {
        self.steps.iter().find(|view| view.step == step)
    }
}

fn derive_step(data: &Data, registry: &StepRegistry, step: FlowStep) -> StepView {
    let is_enabled = registry.is_enabled(step)
        && registry
            .predecessors(step)
            .all(|previous| data.is_completed(previous));
    let is_done = data.is_completed(step);
    let is_current = is_enabled && !is_done && data.current_step == step;

    StepView {
        step,
        details: data.details_text(step),
        is_enabled,
        is_continue_button_visible: is_current && !data.is_validating_step(step),
        is_edit_button_visible: is_enabled && is_done,
        is_highlighted: is_current,
        error: data.step_errors.get(&step).cloned(),
    }
}
