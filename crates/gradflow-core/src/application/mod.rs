/// Thesis workflow engine
pub mod thesis_workflow_service;

/// Defense workflow engine
pub mod defense_workflow_service;

/// Periodic defense status sweep
pub mod sweeper;

/// Per-entity lock registry
pub mod locks;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::events::DomainEvent;
use crate::CoreError;

/// Handler for domain events
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    /// Handle a domain event
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), CoreError>;
}

/// Event handler that only logs, for wiring points with no consumer
pub struct LoggingEventHandler;

#[async_trait]
impl DomainEventHandler for LoggingEventHandler {
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), CoreError> {
        debug!(
            event_type = event.event_type(),
            aggregate_id = event.aggregate_id(),
            "domain event"
        );
        Ok(())
    }
}
