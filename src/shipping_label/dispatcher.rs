// Effect dispatcher
//
// Runs address validation off the reducer loop. At most one request per step
// is current; a newer request aborts the older call and any late answer for a
// request that is no longer current is dropped here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::observability::{OperationTimer, ValidationMetrics};
use crate::shipping_label::errors::ValidationError;
use crate::shipping_label::events::{Event, SideEffect};
use crate::shipping_label::traits::AddressValidator;
use crate::shipping_label::types::*;

/// Answer of one spawned validation call
#[derive(Debug)]
struct Completion {
    step: FlowStep,
    request: RequestId,
    outcome: Result<ValidationResult, ValidationError>,
}

pub struct EffectDispatcher {
    validator: Arc<dyn AddressValidator>,
    timeout: Duration,
    events: mpsc::UnboundedSender<Event>,
    presentation: mpsc::UnboundedSender<SideEffect>,
    current_requests: HashMap<FlowStep, RequestId>,
    in_flight: HashMap<FlowStep, JoinHandle<()>>,
    metrics: Arc<ValidationMetrics>,
}

impl EffectDispatcher {
    pub fn new(
        validator: Arc<dyn AddressValidator>,
        timeout: Duration,
        events: mpsc::UnboundedSender<Event>,
        presentation: mpsc::UnboundedSender<SideEffect>,
        metrics: Arc<ValidationMetrics>,
    ) -> Self {
        Self {
            validator,
            timeout,
            events,
            presentation,
            current_requests: HashMap::new(),
            in_flight: HashMap::new(),
            metrics,
        }
    }

    /// Consume effects until the effect channel closes or shutdown is signaled.
    /// Queued effects win over completions so a superseding request is recorded
    /// before the answer it replaces is looked at.
    pub async fn run(
        mut self,
        mut effects: mpsc::UnboundedReceiver<SideEffect>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let (completions_tx, mut completions) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Effect dispatcher received shutdown");
                        break;
                    }
                }
                effect = effects.recv() => match effect {
                    Some(effect) => self.dispatch(effect, &completions_tx),
                    None => break,
                },
                Some(completion) = completions.recv() => self.complete(completion),
            }
        }

        self.abort_all();
    }

    fn dispatch(&mut self, effect: SideEffect, completions: &mpsc::UnboundedSender<Completion>) {
        match effect {
            SideEffect::ValidateAddress {
                step,
                address,
                request,
            } => self.start_validation(step, address, request, completions),
            SideEffect::NoOp => trace!("Dropping no-op effect"),
            presentation => {
                let name = presentation.name();
                if self.presentation.send(presentation).is_err() {
                    debug!(effect = name, "Presentation receiver gone, dropping effect");
                }
            }
        }
    }

    fn start_validation(
        &mut self,
        step: FlowStep,
        address: Address,
        request: RequestId,
        completions: &mpsc::UnboundedSender<Completion>,
    ) {
        if let Some(previous) = self.in_flight.remove(&step) {
            if !previous.is_finished() {
                previous.abort();
                self.metrics.record_superseded();
                debug!(step = %step, request = %request, "Superseding in-flight validation");
            }
        }

        self.current_requests.insert(step, request);
        self.metrics.record_request();
        info!(step = %step, request = %request, "Validating address");

        if self
            .events
            .send(Event::ValidationStarted { step, request })
            .is_err()
        {
            debug!(step = %step, "Workflow gone, not starting validation");
            return;
        }

        let validator = Arc::clone(&self.validator);
        let timeout = self.timeout;
        let completions = completions.clone();
        let handle = tokio::spawn(async move {
            let timer = OperationTimer::new("validate_address", step);
            let outcome = match tokio::time::timeout(timeout, validator.validate(&address)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ValidationError::Timeout { after: timeout }),
            };
            timer.finish();
            let _ = completions.send(Completion {
                step,
                request,
                outcome,
            });
        });
        self.in_flight.insert(step, handle);
    }

    fn complete(&mut self, completion: Completion) {
        let Completion {
            step,
            request,
            outcome,
        } = completion;

        if self.current_requests.get(&step) != Some(&request) {
            self.metrics.record_superseded();
            debug!(step = %step, request = %request, "Dropping answer for superseded request");
            return;
        }
        self.current_requests.remove(&step);
        self.in_flight.remove(&step);

        let result = match outcome {
            Ok(result) => {
                self.metrics.record_verdict(&result);
                result
            }
            Err(error) => {
                match &error {
                    ValidationError::Timeout { .. } => self.metrics.record_timeout(step),
                    ValidationError::Transport(_) => self.metrics.record_transport_error(),
                    ValidationError::Superseded { .. } => self.metrics.record_superseded(),
                    ValidationError::Rejected(_) => {}
                }
                warn!(step = %step, request = %request, error = %error, "Address validation failed");
                match error.into_verdict() {
                    Some(verdict) => verdict,
                    None => return,
                }
            }
        };

        debug!(step = %step, request = %request, verdict = result.label(), "Address validation finished");
        if self
            .events
            .send(Event::ValidationCompleted {
                step,
                request,
                result,
            })
            .is_err()
        {
            debug!(step = %step, "Workflow gone, dropping verdict");
        }
    }

    fn abort_all(&mut self) {
        for (step, handle) in self.in_flight.drain() {
            if !handle.is_finished() {
                debug!(step = %step, "Aborting in-flight validation");
                handle.abort();
            }
        }
        self.current_requests.clear();
    }
}
