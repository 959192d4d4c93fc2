// Step registry - which steps the flow runs through, in order

use std::collections::BTreeSet;

use crate::config::StepsConfig;
use crate::shipping_label::types::FlowStep;

/// Steps shipped in the first milestone; the rest are only enabled on request
const FIRST_MILESTONE_STEPS: [FlowStep; 2] = [FlowStep::OriginAddress, FlowStep::ShippingAddress];

/// Ordered list of enabled workflow steps, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    enabled: Vec<FlowStep>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StepRegistry {
    pub fn new(include_unfinished_steps: bool) -> Self {
        let enabled = if include_unfinished_steps {
            FlowStep::ALL.to_vec()
        } else {
            FIRST_MILESTONE_STEPS.to_vec()
        };
        Self { enabled }
    }

    pub fn from_config(config: &StepsConfig) -> Self {
        Self::new(config.include_unfinished_steps)
    }

    /// Enabled steps in flow order
    pub fn steps(&self) -> &[FlowStep] {
        &self.enabled
    }

    pub fn is_enabled(&self, step: FlowStep) -> bool {
        self.enabled.contains(&step)
    }

    /// Last enabled step; stays current once everything is completed
    pub fn terminal_step(&self) -> FlowStep {
        self.enabled[self.enabled.len() - 1]
    }

    /// Lowest enabled step not in `completed`, or the terminal step
    pub fn current_step(&self, completed: &BTreeSet<FlowStep>) -> FlowStep {
        self.enabled
            .iter()
            .copied()
            .find(|step| !completed.contains(step))
            .unwrap_or_else(|| self.terminal_step())
    }

    /// Longest prefix of the flow order contained in `completed`
    pub fn completed_prefix(&self, completed: &BTreeSet<FlowStep>) -> BTreeSet<FlowStep> {
        self.enabled
            .iter()
            .copied()
            .take_while(|step| completed.contains(step))
            .collect()
    }

    /// Enabled steps ordered strictly before `step`
    pub fn predecessors(&self, step: FlowStep) -> impl Iterator<Item = FlowStep> + '_ {
        self.enabled.iter().copied().filter(move |other| *other < step)
    }

    pub fn all_completed(&self, completed: &BTreeSet<FlowStep>) -> bool {
        self.enabled.iter().all(|step| completed.contains(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_registry_runs_all_steps() {
        let registry = StepRegistry::new(true);
        assert_eq!(registry.steps(), &FlowStep::ALL);
        assert_eq!(registry.terminal_step(), FlowStep::Payment);
    }

    #[test]
    fn test_first_milestone_registry() {
        let registry = StepRegistry::new(false);
        assert_eq!(registry.steps().len(), 2);
        assert!(!registry.is_enabled(FlowStep::Packaging));
        assert_eq!(registry.terminal_step(), FlowStep::ShippingAddress);
    }

    #[test]
    fn test_current_step_derivation() {
        let registry = StepRegistry::default();
        let mut completed = BTreeSet::new();
        assert_eq!(registry.current_step(&completed), FlowStep::OriginAddress);

        completed.insert(FlowStep::OriginAddress);
        assert_eq!(registry.current_step(&completed), FlowStep::ShippingAddress);

        let everything: BTreeSet<FlowStep> = FlowStep::ALL.into_iter().collect();
        assert_eq!(registry.current_step(&everything), FlowStep::Payment);
        assert!(registry.all_completed(&everything));
    }

    #[test]
    fn test_completed_prefix_drops_gaps() {
        let registry = StepRegistry::default();
        let completed: BTreeSet<FlowStep> =
            [FlowStep::OriginAddress, FlowStep::Packaging].into_iter().collect();

        let prefix = registry.completed_prefix(&completed);
        assert_eq!(prefix.len(), 1);
        assert!(prefix.contains(&FlowStep::OriginAddress));
    }
}
