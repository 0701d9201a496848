//! In-memory state store implementation for the gradflow engines
//!
//! This crate provides in-memory implementations of the repository
//! interfaces defined in the gradflow-core crate. It is primarily useful
//! for development, testing, and simple deployments where persistence is
//! not required.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod repositories;
pub use repositories::{InMemoryDefenseWorkflowRepository, InMemoryThesisWorkflowRepository};

pub mod person_directory;
pub use person_directory::InMemoryPersonDirectory;

use gradflow_core::{
    domain::defense::DefenseWorkflow,
    domain::repository::{DefenseWorkflowRepository, ThesisWorkflowRepository},
    domain::thesis::ThesisWorkflow,
};

/// Provider for in-memory state store repositories
pub struct InMemoryStoreProvider {
    // Shared storage for thesis workflows
    theses: Arc<RwLock<HashMap<String, ThesisWorkflow>>>,

    // Shared storage for defense workflows
    defenses: Arc<RwLock<HashMap<String, DefenseWorkflow>>>,
}

impl InMemoryStoreProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self {
            theses: Arc::new(RwLock::new(HashMap::new())),
            defenses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create repositories over this provider's shared storage
    pub fn create_repositories(
        &self,
    ) -> (
        Arc<dyn ThesisWorkflowRepository>,
        Arc<dyn DefenseWorkflowRepository>,
    ) {
        let thesis_repo = Arc::new(InMemoryThesisWorkflowRepository::new(self.theses.clone()));
        let defense_repo = Arc::new(InMemoryDefenseWorkflowRepository::new(self.defenses.clone()));

        (thesis_repo, defense_repo)
    }
}

impl Default for InMemoryStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}
