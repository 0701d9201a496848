//! Repository traits for the gradflow core
//!
//! This module defines the storage contracts the workflow engines run
//! against. External crates implement these traits to provide different
//! persistence mechanisms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::defense::{DefenseStatus, DefenseWorkflow, DefenseWorkflowId};
use super::person::PersonId;
use super::thesis::{ThesisStatus, ThesisWorkflow, ThesisWorkflowId};
use crate::CoreError;

/// Repository for thesis workflows
#[async_trait]
pub trait ThesisWorkflowRepository: Send + Sync {
    /// Find a thesis workflow by ID
    async fn find_by_id(&self, id: &ThesisWorkflowId)
        -> Result<Option<ThesisWorkflow>, CoreError>;

    /// Find the workflow owned by a student, if any.
    ///
    /// A student has at most one active workflow.
    async fn find_by_student(&self, student_id: &PersonId)
        -> Result<Option<ThesisWorkflow>, CoreError>;

    /// Find all workflows with the given status
    async fn find_by_status(&self, status: ThesisStatus)
        -> Result<Vec<ThesisWorkflow>, CoreError>;

    /// List all thesis workflows
    async fn find_all(&self) -> Result<Vec<ThesisWorkflow>, CoreError>;

    /// Save a thesis workflow
    async fn save(&self, workflow: &ThesisWorkflow) -> Result<(), CoreError>;

    /// Delete a thesis workflow
    async fn delete(&self, id: &ThesisWorkflowId) -> Result<(), CoreError>;
}

/// Repository for defense workflows
#[async_trait]
pub trait DefenseWorkflowRepository: Send + Sync {
    /// Find a defense workflow by ID
    async fn find_by_id(
        &self,
        id: &DefenseWorkflowId,
    ) -> Result<Option<DefenseWorkflow>, CoreError>;

    /// Find the defense owned by a student, if any
    async fn find_by_student(
        &self,
        student_id: &PersonId,
    ) -> Result<Option<DefenseWorkflow>, CoreError>;

    /// Find the defense linked to a thesis, if any.
    ///
    /// The link is one-to-one; at most one defense exists per thesis.
    async fn find_by_thesis(
        &self,
        thesis_id: &ThesisWorkflowId,
    ) -> Result<Option<DefenseWorkflow>, CoreError>;

    /// Find all workflows with the given status
    async fn find_by_status(
        &self,
        status: DefenseStatus,
    ) -> Result<Vec<DefenseWorkflow>, CoreError>;

    /// Find scheduled defenses whose date is strictly before the cutoff.
    ///
    /// Index query backing the status sweep.
    async fn find_scheduled_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<DefenseWorkflow>, CoreError>;

    /// List all defense workflows
    async fn find_all(&self) -> Result<Vec<DefenseWorkflow>, CoreError>;

    /// Save a defense workflow
    async fn save(&self, workflow: &DefenseWorkflow) -> Result<(), CoreError>;
}
