// Label creation session: wires the reducer loop to the effect dispatcher

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use crate::config::LabelFlowConfig;
use crate::observability::{ValidationMetrics, ValidationStats};
use crate::shipping_label::data::Data;
use crate::shipping_label::dispatcher::EffectDispatcher;
use crate::shipping_label::errors::SessionError;
use crate::shipping_label::events::{Event, SideEffect};
use crate::shipping_label::registry::StepRegistry;
use crate::shipping_label::repository::OrderId;
use crate::shipping_label::state_machine::ShippingLabelsStateMachine;
use crate::shipping_label::traits::{AddressValidator, LabelRepository};
use crate::shipping_label::view::ViewState;
use crate::telemetry::{create_session_span, generate_correlation_id};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub registry: StepRegistry,
    pub validation_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&LabelFlowConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(config: &LabelFlowConfig) -> Self {
        Self {
            registry: StepRegistry::from_config(&config.steps),
            validation_timeout: config.validation.timeout(),
        }
    }
}

pub struct LabelCreationSession;

impl LabelCreationSession {
    /// Load the order's data once, then spawn the reducer and dispatcher loops.
    /// Presentation effects arrive on the returned receiver, starting with the
    /// initial view.
    pub async fn start(
        order_id: OrderId,
        repository: &dyn LabelRepository,
        validator: Arc<dyn AddressValidator>,
        options: SessionOptions,
    ) -> Result<(SessionHandle, mpsc::UnboundedReceiver<SideEffect>), SessionError> {
        let session_id = generate_correlation_id();
        let span = create_session_span(order_id.0, &session_id);

        let initial = repository
            .load_initial_data(order_id)
            .instrument(span.clone())
            .await?;
        let machine = ShippingLabelsStateMachine::with_data(options.registry.clone(), initial);
        let data = machine.current_data().clone();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (effects_tx, effects_rx) = mpsc::unbounded_channel();
        let (presentation_tx, presentation_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(data.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let metrics = Arc::new(ValidationMetrics::new());

        // Queued ahead of any event so the first render precedes everything
        let _ = effects_tx.send(SideEffect::UpdateViewState(data.clone()));

        let dispatcher = EffectDispatcher::new(
            validator,
            options.validation_timeout,
            events_tx.clone(),
            presentation_tx,
            Arc::clone(&metrics),
        );
        let dispatcher = tokio::spawn(
            dispatcher
                .run(effects_rx, shutdown_rx.clone())
                .instrument(span.clone()),
        );
        let reducer = tokio::spawn(
            run_reducer(machine, events_rx, effects_tx, snapshots_tx, shutdown_rx)
                .instrument(span.clone()),
        );

        span.in_scope(|| {
            info!(
                current_step = %data.current_step,
                completed = ?data.completed_steps,
                "Label creation session started"
            )
        });

        let handle = SessionHandle {
            session_id,
            order_id,
            started_at: Utc::now(),
            registry: options.registry,
            events: events_tx,
            snapshots: snapshots_rx,
            shutdown: shutdown_tx,
            reducer,
            dispatcher,
            metrics,
        };
        Ok((handle, presentation_rx))
    }
}

/// Processes events strictly one at a time; effects are queued to the
/// dispatcher, never handled here.
async fn run_reducer(
    mut machine: ShippingLabelsStateMachine,
    mut events: mpsc::UnboundedReceiver<Event>,
    effects: mpsc::UnboundedSender<SideEffect>,
    snapshots: watch::Sender<Data>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let was_complete = machine.is_complete();
                let produced = machine.handle_event(&event);
                snapshots.send_replace(machine.current_data().clone());

                if !was_complete && machine.is_complete() {
                    info!("All label steps completed");
                }
                for effect in produced {
                    if effects.send(effect).is_err() {
                        debug!("Effect dispatcher gone, stopping workflow");
                        return;
                    }
                }
            }
        }
    }
    debug!("Workflow reducer stopped");
}

/// Client side of a running session
pub struct SessionHandle {
    session_id: String,
    order_id: OrderId,
    started_at: DateTime<Utc>,
    registry: StepRegistry,
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<Data>,
    shutdown: watch::Sender<bool>,
    reducer: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
    metrics: Arc<ValidationMetrics>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn send(&self, event: Event) -> Result<(), SessionError> {
        if *self.shutdown.borrow() {
            return Err(SessionError::Closed);
        }
        self.events.send(event).map_err(|_| SessionError::Closed)
    }

    /// Latest published snapshot
    pub fn current_data(&self) -> Data {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Data> {
        self.snapshots.clone()
    }

    pub fn view_state(&self) -> ViewState {
        ViewState::derive(&self.snapshots.borrow(), &self.registry)
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&Data) -> bool,
    ) -> Result<Data, SessionError> {
        let mut snapshots = self.subscribe();
        let data = snapshots
            .wait_for(|data| predicate(data))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(data.clone())
    }

    pub fn metrics(&self) -> ValidationStats {
        self.metrics.get_stats()
    }

    /// Stop both loops and abort any running validation
    pub async fn abandon(self) {
        self.shutdown.send_replace(true);

        if let Err(e) = self.reducer.await {
            warn!(error = %e, "Workflow reducer ended abnormally");
        }
        if let Err(e) = self.dispatcher.await {
            warn!(error = %e, "Effect dispatcher ended abnormally");
        }

        let elapsed = Utc::now() - self.started_at;
        info!(
            session_id = %self.session_id,
            order_id = %self.order_id,
            elapsed_ms = elapsed.num_milliseconds(),
            "Label creation session abandoned"
        );
        self.metrics.log_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipping_label::repository::InMemoryLabelRepository;
    use crate::shipping_label::mocks::GatedValidator;
    use crate::shipping_label::types::{Address, FlowStep};

    fn origin() -> Address {
        Address {
            city: "Springfield".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_start_publishes_initial_view() {
        let repository = InMemoryLabelRepository::new()
            .with_order(OrderId(1), Data::new().with_origin_address(origin()));
        let (session, mut presentation) = LabelCreationSession::start(
            OrderId(1),
            &repository,
            Arc::new(GatedValidator::new()),
            SessionOptions::default(),
        )
        .await
        .unwrap();

        match presentation.recv().await {
            Some(SideEffect::UpdateViewState(data)) => {
                assert_eq!(data.current_step, FlowStep::OriginAddress);
                assert_eq!(data.origin_address, Some(origin()));
            }
            other => panic!("expected initial view, got {other:?}"),
        }
        assert!(session.view_state().step(FlowStep::OriginAddress).unwrap().is_highlighted);
        session.abandon().await;
    }

    #[tokio::test]
    async fn test_missing_order_fails_to_start() {
        let result = LabelCreationSession::start(
            OrderId(404),
            &InMemoryLabelRepository::new(),
            Arc::new(GatedValidator::new()),
            SessionOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(SessionError::Repository(_))));
    }

    #[tokio::test]
    async fn test_valid_address_completes_step() {
        let repository = InMemoryLabelRepository::new()
            .with_order(OrderId(1), Data::new().with_origin_address(origin()));
        let (session, _presentation) = LabelCreationSession::start(
            OrderId(1),
            &repository,
            Arc::new(GatedValidator::new()),
            SessionOptions::default(),
        )
        .await
        .unwrap();

        session
            .send(Event::ContinueTapped {
                step: FlowStep::OriginAddress,
            })
            .unwrap();
        let data = session
            .wait_for(|data| data.is_completed(FlowStep::OriginAddress))
            .await
            .unwrap();

        assert_eq!(data.current_step, FlowStep::ShippingAddress);
        assert_eq!(session.metrics().valid, 1);
        session.abandon().await;
    }
}
