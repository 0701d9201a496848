use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    application::locks::EntityLocks,
    application::DomainEventHandler,
    domain::defense::{DefenseStatus, DefenseWorkflow, DefenseWorkflowId, Grade},
    domain::events::DomainEvent,
    domain::person::{PersonId, Role},
    domain::repository::{DefenseWorkflowRepository, ThesisWorkflowRepository},
    domain::thesis::{ThesisStatus, ThesisWorkflowId},
    CoreError,
};

/// Service driving the defense scheduling and grading workflow
pub struct DefenseWorkflowService {
    /// Repository for defense workflows
    defense_repo: Arc<dyn DefenseWorkflowRepository>,

    /// Repository for thesis workflows, read for the one-to-one link
    thesis_repo: Arc<dyn ThesisWorkflowRepository>,

    /// Handler for this engine's own domain events
    event_handler: Arc<dyn DomainEventHandler>,

    /// Per-entity locks, shared with the thesis engine
    entity_locks: Arc<EntityLocks>,
}

impl DefenseWorkflowService {
    /// Create a new defense workflow service
    pub fn new(
        defense_repo: Arc<dyn DefenseWorkflowRepository>,
        thesis_repo: Arc<dyn ThesisWorkflowRepository>,
        event_handler: Arc<dyn DomainEventHandler>,
        entity_locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            defense_repo,
            thesis_repo,
            event_handler,
            entity_locks,
        }
    }

    /// Find a defense workflow by ID
    pub async fn find_by_id(&self, id: &DefenseWorkflowId) -> Result<DefenseWorkflow, CoreError> {
        self.defense_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Defense workflow not found: {}", id)))
    }

    /// Find defense workflows by status
    pub async fn find_by_status(
        &self,
        status: DefenseStatus,
    ) -> Result<Vec<DefenseWorkflow>, CoreError> {
        self.defense_repo.find_by_status(status).await
    }

    /// Find the defense owned by a student, if any
    pub async fn find_by_student(
        &self,
        student_id: &PersonId,
    ) -> Result<Option<DefenseWorkflow>, CoreError> {
        self.defense_repo.find_by_student(student_id).await
    }

    /// Find the defense linked to a thesis, if any
    pub async fn find_by_thesis(
        &self,
        thesis_id: &ThesisWorkflowId,
    ) -> Result<Option<DefenseWorkflow>, CoreError> {
        self.defense_repo.find_by_thesis(thesis_id).await
    }

    /// List all defense workflows
    pub async fn find_all(&self) -> Result<Vec<DefenseWorkflow>, CoreError> {
        self.defense_repo.find_all().await
    }

    /// Open the auto-created defense for a completed thesis.
    ///
    /// Idempotent: an already-linked defense is returned unchanged.
    /// Callers must hold the thesis entity lock; every defense-creating
    /// path locks the thesis id, which is what keeps the link
    /// one-to-one.
    pub async fn open_for_completed_thesis(
        &self,
        thesis_id: &ThesisWorkflowId,
    ) -> Result<DefenseWorkflow, CoreError> {
        if let Some(existing) = self.defense_repo.find_by_thesis(thesis_id).await? {
            debug!(thesis_id = %thesis_id, defense_id = %existing.id, "defense already linked");
            return Ok(existing);
        }

        let thesis = self
            .thesis_repo
            .find_by_id(thesis_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Thesis workflow not found: {}", thesis_id)))?;

        let mut defense = DefenseWorkflow::open(&thesis)?;
        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;

        info!(thesis_id = %thesis_id, defense_id = %defense.id, "defense workflow opened");
        Ok(defense)
    }

    /// Schedule a defense for a completed thesis (coordinator action).
    ///
    /// Direct entry path creating the record in DefenseScheduled; used
    /// when no auto-created record exists for the thesis.
    pub async fn schedule_defense(
        &self,
        thesis_id: &ThesisWorkflowId,
        defense_date: DateTime<Utc>,
        actor_role: Role,
    ) -> Result<DefenseWorkflow, CoreError> {
        if actor_role != Role::Coordinator {
            return Err(CoreError::Unauthorized(format!(
                "Role {} cannot schedule a defense",
                actor_role
            )));
        }

        // Same lock the auto-creation path holds, so the two cannot race
        // into a double link.
        let _guard = self.entity_locks.acquire(&thesis_id.0).await;

        let thesis = self
            .thesis_repo
            .find_by_id(thesis_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Thesis workflow not found: {}", thesis_id)))?;

        if thesis.status != ThesisStatus::SubmittedToFenix {
            return Err(CoreError::InvalidState(
                "Thesis workflow must be completed before scheduling a defense".to_string(),
            ));
        }

        Self::require_future_date(defense_date)?;

        if self.defense_repo.find_by_thesis(thesis_id).await?.is_some() {
            return Err(CoreError::Conflict(
                "Defense already exists for this thesis".to_string(),
            ));
        }

        let mut defense = DefenseWorkflow::open_scheduled(&thesis, defense_date)?;
        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;

        info!(thesis_id = %thesis_id, defense_id = %defense.id, date = %defense_date, "defense scheduled");
        Ok(defense)
    }

    /// Fix the date on an auto-created, still unscheduled defense
    /// (coordinator action)
    pub async fn update_defense_schedule(
        &self,
        id: &DefenseWorkflowId,
        defense_date: DateTime<Utc>,
        actor_role: Role,
    ) -> Result<DefenseWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut defense = self.find_by_id(id).await?;
        Self::require_future_date(defense_date)?;
        defense.schedule(defense_date, actor_role)?;
        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;

        info!(defense_id = %id, date = %defense_date, "defense schedule updated");
        Ok(defense)
    }

    /// Manually move a single scheduled defense into review
    /// (coordinator action)
    pub async fn set_under_review(
        &self,
        id: &DefenseWorkflowId,
        actor_role: Role,
    ) -> Result<DefenseWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut defense = self.find_by_id(id).await?;
        defense.set_under_review(actor_role)?;
        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;

        info!(defense_id = %id, "defense set under review");
        Ok(defense)
    }

    /// Assign the grade and submit to Fenix (coordinator action)
    pub async fn assign_grade_and_submit(
        &self,
        id: &DefenseWorkflowId,
        grade: f64,
        actor_role: Role,
    ) -> Result<DefenseWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut defense = self.find_by_id(id).await?;

        // State precondition first, matching the transition tables: a
        // defense that is not under review fails before grade parsing.
        if defense.status != DefenseStatus::UnderReview {
            return Err(CoreError::InvalidState(format!(
                "Cannot grade defense {} in state: {:?}",
                id, defense.status
            )));
        }

        let grade = Grade::new(grade)?;
        defense.assign_grade_and_submit(grade, actor_role)?;
        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;

        info!(defense_id = %id, grade = %grade, "defense graded and submitted");
        Ok(defense)
    }

    /// Rewind the workflow one step, with state-dependent authorization
    pub async fn revert_to_previous_state(
        &self,
        id: &DefenseWorkflowId,
        actor_role: Role,
    ) -> Result<DefenseWorkflow, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut defense = self.find_by_id(id).await?;
        let from = defense.status;
        defense.revert_to_previous_state(actor_role)?;
        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;

        info!(defense_id = %id, from = %from, to = %defense.status, "defense workflow reverted");
        Ok(defense)
    }

    /// Promote every scheduled defense whose date has passed to review.
    ///
    /// Invoked by the periodic sweeper, or manually by coordinator or
    /// staff. Idempotent; a failing record is logged and skipped so the
    /// batch always completes. Returns how many defenses transitioned.
    pub async fn update_defense_statuses(&self, actor_role: Role) -> Result<usize, CoreError> {
        if actor_role != Role::Coordinator && actor_role != Role::Staff {
            return Err(CoreError::Unauthorized(format!(
                "Role {} cannot run the defense status sweep",
                actor_role
            )));
        }

        let now = Utc::now();
        let candidates = self.defense_repo.find_scheduled_before(now).await?;
        let mut promoted = 0;

        for candidate in candidates {
            match self.promote_one(&candidate.id, now).await {
                Ok(true) => promoted += 1,
                Ok(false) => {}
                Err(error) => {
                    warn!(defense_id = %candidate.id, %error, "sweep skipped failing defense");
                }
            }
        }

        if promoted > 0 {
            info!(promoted, "defense status sweep finished");
        }
        Ok(promoted)
    }

    // Re-checks the status under the entity lock so a sweep racing a
    // manual transition never double-applies.
    async fn promote_one(
        &self,
        id: &DefenseWorkflowId,
        now: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        let _guard = self.entity_locks.acquire(&id.0).await;

        let mut defense = self.find_by_id(id).await?;
        if !defense.promote_if_past_due(now) {
            return Ok(false);
        }

        self.defense_repo.save(&defense).await?;
        self.dispatch_events(&mut defense).await?;
        Ok(true)
    }

    fn require_future_date(defense_date: DateTime<Utc>) -> Result<(), CoreError> {
        if defense_date <= Utc::now() {
            return Err(CoreError::Validation(
                "Defense date must be in the future".to_string(),
            ));
        }
        Ok(())
    }

    async fn dispatch_events(&self, defense: &mut DefenseWorkflow) -> Result<(), CoreError> {
        for event in defense.take_events() {
            debug!(event_type = event.event_type(), "dispatching defense event");
            self.event_handler.handle_event(event).await?;
        }
        Ok(())
    }
}

/// Routes thesis completion events into the defense engine.
///
/// Wire this as the thesis service's event handler so a thesis reaching
/// its terminal state opens exactly one linked defense.
pub struct ThesisCompletionHandler {
    defense_service: Arc<DefenseWorkflowService>,
}

impl ThesisCompletionHandler {
    /// Create a handler feeding the given defense engine
    pub fn new(defense_service: Arc<DefenseWorkflowService>) -> Self {
        Self { defense_service }
    }
}

#[async_trait]
impl DomainEventHandler for ThesisCompletionHandler {
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), CoreError> {
        if event.event_type() == "thesis.submitted_to_fenix" {
            let thesis_id = ThesisWorkflowId(event.aggregate_id().to_string());
            self.defense_service
                .open_for_completed_thesis(&thesis_id)
                .await?;
        } else {
            debug!(
                event_type = event.event_type(),
                aggregate_id = event.aggregate_id(),
                "thesis event"
            );
        }
        Ok(())
    }
}
