use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gradflow_core::{
    CoreError,
    domain::defense::{DefenseStatus, DefenseWorkflow},
    domain::person::PersonId,
    domain::repository::{DefenseWorkflowRepository, ThesisWorkflowRepository},
    domain::thesis::{ThesisStatus, ThesisWorkflow, ThesisWorkflowId},
    DefenseWorkflowId,
};

/// In-memory implementation of the ThesisWorkflowRepository
pub struct InMemoryThesisWorkflowRepository {
    workflows: Arc<RwLock<HashMap<String, ThesisWorkflow>>>,
}

impl InMemoryThesisWorkflowRepository {
    /// Create a new in-memory thesis workflow repository
    pub fn new(workflows: Arc<RwLock<HashMap<String, ThesisWorkflow>>>) -> Self {
        Self { workflows }
    }
}

#[async_trait]
impl ThesisWorkflowRepository for InMemoryThesisWorkflowRepository {
    async fn find_by_id(
        &self,
        id: &ThesisWorkflowId,
    ) -> Result<Option<ThesisWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows.get(&id.0).cloned())
    }

    async fn find_by_student(
        &self,
        student_id: &PersonId,
    ) -> Result<Option<ThesisWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .find(|workflow| workflow.student_id == *student_id)
            .cloned())
    }

    async fn find_by_status(
        &self,
        status: ThesisStatus,
    ) -> Result<Vec<ThesisWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .filter(|workflow| workflow.status == status)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<ThesisWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows.values().cloned().collect())
    }

    async fn save(&self, workflow: &ThesisWorkflow) -> Result<(), CoreError> {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.id.0.clone(), workflow.clone());
        Ok(())
    }

    async fn delete(&self, id: &ThesisWorkflowId) -> Result<(), CoreError> {
        let mut workflows = self.workflows.write().await;
        workflows.remove(&id.0);
        Ok(())
    }
}

/// In-memory implementation of the DefenseWorkflowRepository
pub struct InMemoryDefenseWorkflowRepository {
    workflows: Arc<RwLock<HashMap<String, DefenseWorkflow>>>,
}

impl InMemoryDefenseWorkflowRepository {
    /// Create a new in-memory defense workflow repository
    pub fn new(workflows: Arc<RwLock<HashMap<String, DefenseWorkflow>>>) -> Self {
        Self { workflows }
    }
}

#[async_trait]
impl DefenseWorkflowRepository for InMemoryDefenseWorkflowRepository {
    async fn find_by_id(
        &self,
        id: &DefenseWorkflowId,
    ) -> Result<Option<DefenseWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows.get(&id.0).cloned())
    }

    async fn find_by_student(
        &self,
        student_id: &PersonId,
    ) -> Result<Option<DefenseWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .find(|workflow| workflow.student_id == *student_id)
            .cloned())
    }

    async fn find_by_thesis(
        &self,
        thesis_id: &ThesisWorkflowId,
    ) -> Result<Option<DefenseWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .find(|workflow| workflow.thesis_id == *thesis_id)
            .cloned())
    }

    async fn find_by_status(
        &self,
        status: DefenseStatus,
    ) -> Result<Vec<DefenseWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .filter(|workflow| workflow.status == status)
            .cloned()
            .collect())
    }

    async fn find_scheduled_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<DefenseWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows
            .values()
            .filter(|workflow| {
                workflow.status == DefenseStatus::DefenseScheduled
                    && workflow
                        .defense_date
                        .map(|date| date < cutoff)
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<DefenseWorkflow>, CoreError> {
        let workflows = self.workflows.read().await;
        Ok(workflows.values().cloned().collect())
    }

    async fn save(&self, workflow: &DefenseWorkflow) -> Result<(), CoreError> {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.id.0.clone(), workflow.clone());
        Ok(())
    }
}
