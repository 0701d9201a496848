//!
//! Gradflow Core - workflow engines for the thesis approval process
//!
//! This crate defines the two finite-state workflows at the heart of the
//! system: the thesis approval pipeline a proposal moves through from
//! submission to Fenix export, and the defense scheduling and grading
//! pipeline opened when a thesis completes. Persistence and the person
//! directory are consumed through traits; other crates provide the
//! implementations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - entities, value objects, statuses, and rules
pub mod domain;

/// Application services - workflow engines and the status sweep
pub mod application;

/// Error types
pub mod error;

// Re-export key types
pub use error::CoreError;

pub use domain::defense::{DefenseStatus, DefenseWorkflow, DefenseWorkflowId, Grade};
pub use domain::events::DomainEvent;
pub use domain::person::{Person, PersonDirectory, PersonId, Role};
pub use domain::repository::{DefenseWorkflowRepository, ThesisWorkflowRepository};
pub use domain::thesis::{ThesisStatus, ThesisWorkflow, ThesisWorkflowId};

pub use application::defense_workflow_service::{DefenseWorkflowService, ThesisCompletionHandler};
pub use application::locks::EntityLocks;
pub use application::sweeper::{StatusSweeper, SweeperConfig, SweeperHandle};
pub use application::thesis_workflow_service::ThesisWorkflowService;
pub use application::{DomainEventHandler, LoggingEventHandler};
