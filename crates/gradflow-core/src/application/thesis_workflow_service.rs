use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    application::locks::EntityLocks,
    application::DomainEventHandler,
    domain::events::ThesisProposalRejected,
    domain::person::{PersonDirectory, PersonId, Role},
    domain::repository::ThesisWorkflowRepository,
    domain::thesis::{ThesisStatus, ThesisWorkflow, ThesisWorkflowId},
    CoreError,
};

/// Largest admissible jury
const MAX_JURY_SIZE: usize = 5;

/// Shortest admissible title, in characters after trimming
const MIN_TITLE_LEN: usize = 3;

/// Service driving the thesis approval workflow
pub struct ThesisWorkflowService {
    /// Repository for thesis workflows
    thesis_repo: Arc<dyn ThesisWorkflowRepository>,

    /// Read-only person directory
    person_directory: Arc<dyn PersonDirectory>,

    /// Handler for domain events; the defense engine listens here for
    /// thesis completion
    event_handler: Arc<dyn DomainEventHandler>,

    /// Per-entity locks, shared with the defense engine
    entity_locks: Arc<EntityLocks>,
}

impl ThesisWorkflowService {
    /// Create a new thesis workflow service
    pub fn new(
        thesis_repo: Arc<dyn ThesisWorkflowRepository>,
        person_directory: Arc<dyn PersonDirectory>,
        event_handler: Arc<dyn DomainEventHandler>,
        entity_locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            thesis_repo,
            person_directory,
            event_handler,
            entity_locks,
        }
    }

    /// Find a thesis workflow by ID
    pub async fn find_by_id(&self, id: &ThesisWorkflowId) -> Result<ThesisWorkflow, CoreError> {
        self.thesis_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Thesis workflow not found: {}", id)))
    }

    /// Find thesis workflows by status
    pub async fn find_by_status(
        &self,
        status: ThesisStatus,
    ) -> Result<Vec<ThesisWorkflow>, CoreError> {
        self.thesis_repo.find_by_status(status).await
    }

    /// Find the workflow owned by a student, if any
    pub async fn find_by_student(
        &self,
        student_id: &PersonId,
    ) -> Result<Option<ThesisWorkflow>, CoreError> {
        self.thesis_repo.find_by_student(student_id).await
    }

    /// List all thesis workflows
    pub async fn find_all(&self) -> Result<Vec<ThesisWorkflow>, CoreError> {
        self.thesis_repo.find_all().await
    }

    /// Submit a new thesis jury proposal (student action)
    pub async fn submit_jury_proposal(
        &self,
        student_id: &PersonId,
        title: &str,
        jury_member_ids: Vec<PersonId>,
    ) -> Result<ThesisWorkflow, CoreError> {
        if title.trim().chars().count() < MIN_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "Thesis title must be at least {} characters long",
                MIN_TITLE_LEN
            )));
        }

        if jury_member_ids.is_empty() || jury_member_ids.len() > MAX_JURY_SIZE {
            return Err(CoreError::Validation(format!(
                "Jury must have between 1 and {} members",
                MAX_JURY_SIZE
            )));
        }

        let student = self
            .person_directory
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Person not found: {}", student_id)))?;

        if !student.has_role(Role::Student) {
            return Err(CoreError::Validation(format!(
                "Person {} is not a student",
                student_id
            )));
        }

        // One active workflow per student; the lock closes the window
        // between the duplicate check and the save.
        let _guard = self
            .entity_locks
            .acquire(&format!("student:{}", student_id))
            .await;

        if self.thesis_repo.find_by_student(student_id).await?.is_some() {
            return Err(CoreError::Conflict(
                "Student already has a thesis".to_string(),
            ));
        }

        // Any unresolved jury id fails the whole call
        for member_id in &jury_member_ids {
            let member = self
                .person_directory
                .find_by_id(member_id)
                .await?
                .ok_or_else(|| {
                    CoreError::NotFound(format!("Jury member not found: {}", member_id))
                })?;

            if !member.has_role(Role::Teacher) {
                return Err(CoreError::Validation(
                    "All jury members must be teachers".to_string(),
                ));
            }
        }

        let mut thesis =
            ThesisWorkflow::new(student_id.clone(), title.to_string(), jury_member_ids);
        self.thesis_repo.save(&thesis).await?;
        self.dispatch_events(&mut thesis).await?;

        info!(thesis_id = %thesis.id, student_id = %student_id, "jury proposal submitted");
        Ok(thesis)
    }

    /// Approve a proposal (scientific committee action)
    pub async fn approve_by_scientific_committee(
        &self,
        id: &ThesisWorkflowId,
        actor_role: Role,
    ) -> Result<ThesisWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut thesis = self.find_by_id(id).await?;
        thesis.approve_by_sc(actor_role)?;
        self.thesis_repo.save(&thesis).await?;
        self.dispatch_events(&mut thesis).await?;

        info!(thesis_id = %id, "proposal approved by scientific committee");
        Ok(thesis)
    }

    /// Assign the jury president (coordinator action)
    pub async fn assign_jury_president(
        &self,
        id: &ThesisWorkflowId,
        president_id: &PersonId,
        actor_role: Role,
    ) -> Result<ThesisWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut thesis = self.find_by_id(id).await?;

        self.person_directory
            .find_by_id(president_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Person not found: {}", president_id)))?;

        thesis.assign_jury_president(president_id.clone(), actor_role)?;
        self.thesis_repo.save(&thesis).await?;
        self.dispatch_events(&mut thesis).await?;

        info!(thesis_id = %id, president_id = %president_id, "jury president assigned");
        Ok(thesis)
    }

    /// Record the signed document path (coordinator action)
    pub async fn upload_signed_document(
        &self,
        id: &ThesisWorkflowId,
        document_path: &str,
        actor_role: Role,
    ) -> Result<ThesisWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut thesis = self.find_by_id(id).await?;
        thesis.upload_signed_document(document_path.to_string(), actor_role)?;
        self.thesis_repo.save(&thesis).await?;
        self.dispatch_events(&mut thesis).await?;

        info!(thesis_id = %id, "signed document uploaded");
        Ok(thesis)
    }

    /// Submit to Fenix (staff action)
    ///
    /// Completing the workflow opens the linked defense: the completion
    /// event is dispatched while the entity lock is still held, so the
    /// status write and the defense creation land as one step and no
    /// concurrent caller can observe the gap between them.
    pub async fn submit_to_fenix(
        &self,
        id: &ThesisWorkflowId,
        actor_role: Role,
    ) -> Result<ThesisWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut thesis = self.find_by_id(id).await?;
        thesis.submit_to_fenix(actor_role)?;
        self.thesis_repo.save(&thesis).await?;
        self.dispatch_events(&mut thesis).await?;

        info!(thesis_id = %id, "thesis submitted to Fenix");
        Ok(thesis)
    }

    /// Rewind the workflow one step, with state-dependent authorization
    pub async fn revert_to_previous_state(
        &self,
        id: &ThesisWorkflowId,
        actor_role: Role,
    ) -> Result<ThesisWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut thesis = self.find_by_id(id).await?;
        let from = thesis.status;
        thesis.revert_to_previous_state(actor_role)?;
        self.thesis_repo.save(&thesis).await?;
        self.dispatch_events(&mut thesis).await?;

        info!(thesis_id = %id, from = %from, to = %thesis.status, "thesis workflow reverted");
        Ok(thesis)
    }

    /// Reject a proposal (scientific committee action)
    ///
    /// Hard-deletes the workflow; the student must submit a new proposal.
    pub async fn reject_thesis_proposal(
        &self,
        id: &ThesisWorkflowId,
        actor_role: Role,
        comments: Option<String>,
    ) -> Result<(), CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let thesis = self.find_by_id(id).await?;

        if thesis.status != ThesisStatus::ProposalSubmitted {
            return Err(CoreError::InvalidState(format!(
                "Cannot reject thesis {} in state: {:?}",
                id, thesis.status
            )));
        }

        if actor_role != Role::ScientificCommittee {
            return Err(CoreError::Unauthorized(format!(
                "Role {} cannot reject a proposal",
                actor_role
            )));
        }

        self.thesis_repo.delete(id).await?;

        self.event_handler
            .handle_event(Box::new(ThesisProposalRejected {
                thesis_id: id.clone(),
                comments,
                timestamp: Utc::now(),
            }))
            .await?;

        info!(thesis_id = %id, "thesis proposal rejected and deleted");
        Ok(())
    }

    async fn dispatch_events(&self, thesis: &mut ThesisWorkflow) -> Result<(), CoreError> {
        for event in thesis.take_events() {
            debug!(event_type = event.event_type(), "dispatching thesis event");
            self.event_handler.handle_event(event).await?;
        }
        Ok(())
    }
}
