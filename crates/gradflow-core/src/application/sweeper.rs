//! Periodic promotion of past-due defenses.
//!
//! The sweep is the one transition not driven by a direct user action:
//! scheduled defenses whose date has passed move to review on a timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::application::defense_workflow_service::DefenseWorkflowService;
use crate::domain::person::Role;

/// Sweep configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to run the sweep
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Periodic runner for the defense status sweep
pub struct StatusSweeper {
    defense_service: Arc<DefenseWorkflowService>,
    config: SweeperConfig,
}

impl StatusSweeper {
    /// Create a sweeper over the given defense engine
    pub fn new(defense_service: Arc<DefenseWorkflowService>, config: SweeperConfig) -> Self {
        Self {
            defense_service,
            config,
        }
    }

    /// Spawn the sweep loop on the runtime.
    ///
    /// The loop runs until the returned handle is shut down. Sweep
    /// failures are logged and the loop keeps going; a broken store
    /// should not take the timer down with it.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match self.defense_service.update_defense_statuses(Role::Staff).await {
                            Ok(promoted) => {
                                debug!(promoted, "periodic defense sweep ran");
                            }
                            Err(err) => {
                                error!(%err, "periodic defense sweep failed");
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("defense sweeper shutting down");
                        break;
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            handle,
        }
    }
}

/// Handle to a running sweeper
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweep loop and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }

    /// Abort the sweep loop without waiting
    pub fn abort(&self) {
        self.handle.abort();
    }
}
