use anyhow::Result;
use statig::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::cli::SuggestionPick;
use crate::shipping_label::{
    AddressSuggestion, Data, Event, FlowStep, LabelCreationSession, LabelFixture, SessionHandle,
    SessionOptions, SideEffect, SuggestionChoice, ViewState,
};
use crate::shutdown::ShutdownCoordinator;

/// How a headless session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Data),
    StepFailed { step: FlowStep, reason: String },
    /// The workflow asked for an address editor, which needs a person
    NeedsInput(FlowStep),
    Interrupted,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

enum Reaction {
    Wait,
    Finish(RunOutcome),
}

/// Plays the user: taps continue on the highlighted step and settles
/// address suggestions with a fixed choice.
pub struct RunCommand {
    pub fixture: PathBuf,
    pub choose: SuggestionPick,
    pub json: bool,
    options: SessionOptions,
    shutdown: ShutdownCoordinator,
}

impl RunCommand {
    pub fn new(fixture: PathBuf) -> Self {
        Self {
            fixture,
            choose: SuggestionPick::Suggested,
            json: false,
            options: SessionOptions::default(),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    pub fn with_choice(mut self, choose: SuggestionPick) -> Self {
        self.choose = choose;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub async fn execute(&self) -> Result<RunOutcome> {
        let fixture = LabelFixture::load(&self.fixture).await?;
        if !self.json {
            println!("📦 Creating shipping label for order {}", fixture.order_id);
            println!();
        }

        let repository = fixture.repository();
        let (session, mut presentation) = LabelCreationSession::start(
            fixture.order_id(),
            &repository,
            Arc::new(fixture.validator()),
            self.options.clone(),
        )
        .await?;
        info!(session_id = session.session_id(), "Driving label session");

        let mut shutdown = self.shutdown.subscribe();
        let outcome = loop {
            tokio::select! {
                biased;
                _ = shutdown.wait_for(|triggered| *triggered) => {
                    break RunOutcome::Interrupted;
                }
                effect = presentation.recv() => {
                    let Some(effect) = effect else {
                        break RunOutcome::Interrupted;
                    };
                    match self.react(&session, effect) {
                        Ok(Reaction::Wait) => {}
                        Ok(Reaction::Finish(outcome)) => break outcome,
                        Err(e) => {
                            session.abandon().await;
                            return Err(e);
                        }
                    }
                }
            }
        };

        session.abandon().await;
        if !self.json {
            self.report(&outcome);
        }
        Ok(outcome)
    }

    fn react(&self, session: &SessionHandle, effect: SideEffect) -> Result<Reaction> {
        match effect {
            SideEffect::UpdateViewState(data) => {
                let view = ViewState::derive(&data, session.registry());
                self.render(&view)?;

                if view.is_complete {
                    return Ok(Reaction::Finish(RunOutcome::Completed(data)));
                }
                let Some(current) = view.steps.iter().find(|step| step.is_highlighted) else {
                    return Ok(Reaction::Wait);
                };
                if let Some(reason) = &current.error {
                    return Ok(Reaction::Finish(RunOutcome::StepFailed {
                        step: current.step,
                        reason: reason.clone(),
                    }));
                }
                // The suggestion screen settles this step; tapping continue
                // would withdraw the suggestion and validate again
                if data.pending_suggestion_for(current.step).is_some() {
                    return Ok(Reaction::Wait);
                }
                if current.is_continue_button_visible {
                    session.send(Event::ContinueTapped { step: current.step })?;
                }
                Ok(Reaction::Wait)
            }
            SideEffect::ShowSuggestedAddress {
                step,
                original,
                suggested,
            } => {
                let mut suggestion =
                    AddressSuggestion::new(step, original, suggested).state_machine();
                suggestion.handle(&SuggestionChoice::from(self.choose));
                suggestion.handle(&SuggestionChoice::UseSelected);

                let screen = suggestion.inner();
                if !self.json {
                    println!("🔍 {}: the address service suggested a correction", screen.title());
                    println!("   entered:   {}", one_line(&screen.entered().to_string()));
                    println!("   suggested: {}", one_line(&screen.suggested().to_string()));
                    println!("   keeping the {:?} address", self.choose);
                }
                if let Some(event) = screen.resolution().cloned() {
                    session.send(event)?;
                }
                Ok(Reaction::Wait)
            }
            SideEffect::OpenAddressEditor { step, .. } => {
                Ok(Reaction::Finish(RunOutcome::NeedsInput(step)))
            }
            // Handled by the dispatcher; never forwarded
            SideEffect::ValidateAddress { .. } | SideEffect::NoOp => Ok(Reaction::Wait),
        }
    }

    fn render(&self, view: &ViewState) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(view)?);
            return Ok(());
        }

        for step in &view.steps {
            if !step.is_enabled && step.details.is_empty() {
                continue;
            }
            let icon = if step.is_edit_button_visible {
                "✅"
            } else if step.is_highlighted {
                "👉"
            } else {
                "⏸️ "
            };
            let details = if step.details.is_empty() {
                "-".to_string()
            } else {
                one_line(&step.details)
            };
            println!("{icon} {:<16} {details}", step.step.as_str());
            if let Some(error) = &step.error {
                println!("   ⚠️  {error}");
            }
        }
        if view.is_progress_visible {
            println!("⏳ Validating address...");
        }
        println!();
        Ok(())
    }

    fn report(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Completed(_) => println!("🎉 All steps completed, label is ready to purchase"),
            RunOutcome::StepFailed { step, reason } => {
                println!("❌ {step} could not be completed: {reason}")
            }
            RunOutcome::NeedsInput(step) => {
                println!("✏️  {step} needs an address entered by hand")
            }
            RunOutcome::Interrupted => println!("🛑 Session interrupted"),
        }
    }
}

fn one_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(", ")
}
