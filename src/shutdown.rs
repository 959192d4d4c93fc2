use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Graceful shutdown coordinator for label-flow
#[derive(Clone)]
pub struct ShutdownCoordinator {
    signal: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    pub fn trigger(&self) {
        if !self.signal.send_replace(true) {
            info!("Initiating graceful shutdown");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.signal.borrow()
    }

    /// Trigger shutdown on SIGINT
    pub fn install_signal_handlers(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received interrupt signal");
                    coordinator.trigger();
                }
                Err(e) => warn!(error = %e, "Failed to listen for interrupt signal"),
            }
        })
    }

    /// Resolve once shutdown has been triggered
    pub async fn wait_for_shutdown(&self) {
        let mut receiver = self.subscribe();
        // The sender lives in self, so this only fails if it is dropped mid-wait
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}
