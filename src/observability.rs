use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::shipping_label::types::{FlowStep, ValidationResult};

/// Address validation counters for one session
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    pub requests: AtomicU64,
    pub valid: AtomicU64,
    pub suggested: AtomicU64,
    pub invalid: AtomicU64,
    pub timeouts: AtomicU64,
    pub transport_errors: AtomicU64,
    pub superseded: AtomicU64,
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verdict(&self, result: &ValidationResult) {
        let counter = match result {
            ValidationResult::Valid(_) => &self.valid,
            ValidationResult::Suggested { .. } => &self.suggested,
            ValidationResult::Invalid { .. } => &self.invalid,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self, step: FlowStep) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        warn!(step = %step, "Address validation timed out");
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            requests: self.requests.load(Ordering::Relaxed),
            valid: self.valid.load(Ordering::Relaxed),
            suggested: self.suggested.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            requests = stats.requests,
            valid = stats.valid,
            suggested = stats.suggested,
            invalid = stats.invalid,
            timeouts = stats.timeouts,
            transport_errors = stats.transport_errors,
            superseded = stats.superseded,
            "Address validation metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    pub requests: u64,
    pub valid: u64,
    pub suggested: u64,
    pub invalid: u64,
    pub timeouts: u64,
    pub transport_errors: u64,
    pub superseded: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: &'static str,
    step: FlowStep,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &'static str, step: FlowStep) -> Self {
        Self {
            operation,
            step,
            start: Instant::now(),
        }
    }

    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        info!(
            operation = self.operation,
            step = %self.step,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_verdicts() {
        let metrics = ValidationMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_verdict(&ValidationResult::Valid(Default::default()));
        metrics.record_verdict(&ValidationResult::invalid("timeout"));
        metrics.record_timeout(FlowStep::OriginAddress);
        metrics.record_superseded();

        let stats = metrics.get_stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.superseded, 1);
        assert_eq!(stats.suggested, 0);
    }
}
