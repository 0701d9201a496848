use crate::{
    domain::events::{
        DefenseGraded, DefenseOpened, DefenseScheduled as DefenseScheduledEvent,
        DefenseStatusReverted, DefenseUnderReview, DomainEvent,
    },
    domain::person::{PersonId, Role},
    domain::thesis::{ThesisStatus, ThesisWorkflow, ThesisWorkflowId},
    CoreError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Defense grade, 0.00 to 20.00 with two fractional digits.
///
/// Stored as hundredths of a point so equality and serialization are
/// exact; values with more precision are rounded to the stored scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Grade(u16);

impl Grade {
    /// Highest admissible grade, in hundredths
    const MAX_CENTI: u16 = 2000;

    /// Validate and construct a grade from a point value
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || !(0.0..=20.0).contains(&value) {
            return Err(CoreError::Validation(
                "Grade must be between 0 and 20".to_string(),
            ));
        }

        let centi = (value * 100.0).round() as u16;
        debug_assert!(centi <= Self::MAX_CENTI);
        Ok(Grade(centi))
    }

    /// The grade as a point value
    pub fn value(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value())
    }
}

impl TryFrom<f64> for Grade {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

impl From<Grade> for f64 {
    fn from(grade: Grade) -> Self {
        grade.value()
    }
}

/// Defense workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DefenseStatus {
    /// Auto-created starting point, no date yet
    Unscheduled,

    /// Defense date fixed
    DefenseScheduled,

    /// Defense held, awaiting grading
    UnderReview,

    /// Graded and submitted to Fenix (terminal)
    SubmittedToFenix,
}

impl DefenseStatus {
    /// All states in forward order
    pub const ALL: [DefenseStatus; 4] = [
        DefenseStatus::Unscheduled,
        DefenseStatus::DefenseScheduled,
        DefenseStatus::UnderReview,
        DefenseStatus::SubmittedToFenix,
    ];

    /// Stable storage label for this status.
    ///
    /// These strings are the persisted encoding and must never change.
    pub fn label(&self) -> &'static str {
        match self {
            DefenseStatus::Unscheduled => "Por Agendar",
            DefenseStatus::DefenseScheduled => "Defesa Agendada",
            DefenseStatus::UnderReview => "Em Revisão",
            DefenseStatus::SubmittedToFenix => "Submetido ao Fenix",
        }
    }

    /// Decode a status from its storage label
    pub fn from_label(value: &str) -> Result<Self, CoreError> {
        DefenseStatus::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown defense status: {}", value)))
    }

    /// The status one step forward, if any
    pub fn next(&self) -> Option<DefenseStatus> {
        match self {
            DefenseStatus::Unscheduled => Some(DefenseStatus::DefenseScheduled),
            DefenseStatus::DefenseScheduled => Some(DefenseStatus::UnderReview),
            DefenseStatus::UnderReview => Some(DefenseStatus::SubmittedToFenix),
            DefenseStatus::SubmittedToFenix => None,
        }
    }

    /// Role allowed to advance a workflow out of this status
    pub fn advance_role(&self) -> Option<Role> {
        match self {
            DefenseStatus::Unscheduled => Some(Role::Coordinator),
            DefenseStatus::DefenseScheduled => Some(Role::Coordinator),
            DefenseStatus::UnderReview => Some(Role::Coordinator),
            DefenseStatus::SubmittedToFenix => None,
        }
    }

    /// The revert target, if any.
    ///
    /// DefenseScheduled is the revert floor even for workflows that
    /// started out Unscheduled.
    pub fn previous(&self) -> Option<DefenseStatus> {
        match self {
            DefenseStatus::SubmittedToFenix => Some(DefenseStatus::UnderReview),
            DefenseStatus::UnderReview => Some(DefenseStatus::DefenseScheduled),
            DefenseStatus::DefenseScheduled | DefenseStatus::Unscheduled => None,
        }
    }

    /// Role allowed to revert a workflow out of this status
    pub fn revert_role(&self) -> Option<Role> {
        match self {
            DefenseStatus::SubmittedToFenix => Some(Role::Coordinator),
            DefenseStatus::UnderReview => Some(Role::Coordinator),
            DefenseStatus::DefenseScheduled | DefenseStatus::Unscheduled => None,
        }
    }

    /// True for the terminal status
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for DefenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DefenseStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DefenseStatus::from_label(value)
    }
}

impl TryFrom<String> for DefenseStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DefenseStatus::from_label(&value)
    }
}

impl From<DefenseStatus> for String {
    fn from(status: DefenseStatus) -> Self {
        status.label().to_string()
    }
}

/// Value object: Defense workflow ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefenseWorkflowId(pub String);

impl fmt::Display for DefenseWorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate: Defense scheduling and grading workflow
#[derive(Debug, Serialize, Deserialize)]
pub struct DefenseWorkflow {
    /// Unique identifier
    pub id: DefenseWorkflowId,

    /// Owning student, always the thesis student
    pub student_id: PersonId,

    /// The completed thesis this defense belongs to (one-to-one)
    pub thesis_id: ThesisWorkflowId,

    /// Current status
    pub status: DefenseStatus,

    /// Defense date, set when leaving Unscheduled
    pub defense_date: Option<DateTime<Utc>>,

    /// Grade, set together with the review-complete transition
    pub grade: Option<Grade>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,

    /// Domain events
    #[serde(skip)]
    pub events: Vec<Box<dyn DomainEvent>>,
}

// Manually implement Clone: domain events are not cloned
impl Clone for DefenseWorkflow {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            student_id: self.student_id.clone(),
            thesis_id: self.thesis_id.clone(),
            status: self.status,
            defense_date: self.defense_date,
            grade: self.grade,
            updated_at: self.updated_at,
            events: Vec::new(),
        }
    }
}

impl DefenseWorkflow {
    fn for_thesis(thesis: &ThesisWorkflow, status: DefenseStatus) -> Result<Self, CoreError> {
        if thesis.status != ThesisStatus::SubmittedToFenix {
            return Err(CoreError::InvalidState(format!(
                "Defense can only be opened for a thesis in state {:?}, thesis {} is in {:?}",
                ThesisStatus::SubmittedToFenix,
                thesis.id,
                thesis.status
            )));
        }

        Ok(Self {
            id: DefenseWorkflowId(Uuid::new_v4().to_string()),
            student_id: thesis.student_id.clone(),
            thesis_id: thesis.id.clone(),
            status,
            defense_date: None,
            grade: None,
            updated_at: Utc::now(),
            events: Vec::with_capacity(4),
        })
    }

    /// Open the auto-created defense for a completed thesis
    pub fn open(thesis: &ThesisWorkflow) -> Result<Self, CoreError> {
        let mut defense = Self::for_thesis(thesis, DefenseStatus::Unscheduled)?;

        let event = DefenseOpened {
            defense_id: defense.id.clone(),
            thesis_id: defense.thesis_id.clone(),
            timestamp: defense.updated_at,
        };
        defense.record_event(Box::new(event));

        Ok(defense)
    }

    /// Create a defense directly in DefenseScheduled.
    ///
    /// Administrative entry path used when no auto-created record
    /// exists for the thesis.
    pub fn open_scheduled(
        thesis: &ThesisWorkflow,
        defense_date: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let mut defense = Self::for_thesis(thesis, DefenseStatus::DefenseScheduled)?;
        defense.defense_date = Some(defense_date);

        let event = DefenseScheduledEvent {
            defense_id: defense.id.clone(),
            defense_date,
            timestamp: defense.updated_at,
        };
        defense.record_event(Box::new(event));

        Ok(defense)
    }

    /// Update the timestamp
    #[inline]
    pub fn update_timestamp(&mut self) {
        self.updated_at = Utc::now();
    }

    fn authorize(&self, required: Role, actor_role: Role, action: &str) -> Result<(), CoreError> {
        if actor_role != required {
            return Err(CoreError::Unauthorized(format!(
                "Role {} cannot {} a defense in state {:?}",
                actor_role, action, self.status
            )));
        }
        Ok(())
    }

    /// Fix the defense date on an auto-created workflow (coordinator action)
    pub fn schedule(
        &mut self,
        defense_date: DateTime<Utc>,
        actor_role: Role,
    ) -> Result<(), CoreError> {
        if self.status != DefenseStatus::Unscheduled {
            return Err(CoreError::InvalidState(format!(
                "Cannot schedule defense {} in state: {:?}",
                self.id, self.status
            )));
        }
        self.authorize(Role::Coordinator, actor_role, "schedule")?;

        self.defense_date = Some(defense_date);
        self.status = DefenseStatus::DefenseScheduled;

        self.record_event(Box::new(DefenseScheduledEvent {
            defense_id: self.id.clone(),
            defense_date,
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    /// Move a scheduled defense into review (coordinator action)
    pub fn set_under_review(&mut self, actor_role: Role) -> Result<(), CoreError> {
        if self.status != DefenseStatus::DefenseScheduled {
            return Err(CoreError::InvalidState(format!(
                "Cannot review defense {} in state: {:?}",
                self.id, self.status
            )));
        }
        self.authorize(Role::Coordinator, actor_role, "review")?;

        self.transition_under_review();
        Ok(())
    }

    /// Sweep path: move into review when the defense date has passed.
    ///
    /// Returns whether a transition happened; reapplying is a no-op.
    pub fn promote_if_past_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != DefenseStatus::DefenseScheduled {
            return false;
        }
        match self.defense_date {
            Some(date) if date < now => {
                self.transition_under_review();
                true
            }
            _ => false,
        }
    }

    fn transition_under_review(&mut self) {
        self.status = DefenseStatus::UnderReview;
        self.record_event(Box::new(DefenseUnderReview {
            defense_id: self.id.clone(),
            timestamp: Utc::now(),
        }));
        self.update_timestamp();
    }

    /// Assign the grade and submit to Fenix (coordinator action)
    pub fn assign_grade_and_submit(
        &mut self,
        grade: Grade,
        actor_role: Role,
    ) -> Result<(), CoreError> {
        if self.status != DefenseStatus::UnderReview {
            return Err(CoreError::InvalidState(format!(
                "Cannot grade defense {} in state: {:?}",
                self.id, self.status
            )));
        }
        self.authorize(Role::Coordinator, actor_role, "grade")?;

        self.grade = Some(grade);
        self.status = DefenseStatus::SubmittedToFenix;

        self.record_event(Box::new(DefenseGraded {
            defense_id: self.id.clone(),
            grade,
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    /// Rewind the status one step.
    ///
    /// The grade and date are retained; only the status moves back.
    pub fn revert_to_previous_state(&mut self, actor_role: Role) -> Result<(), CoreError> {
        let from = self.status;

        let to = from.previous().ok_or_else(|| {
            CoreError::InvalidState(format!(
                "Cannot revert defense {} from state: {:?}",
                self.id, from
            ))
        })?;

        let required = from.revert_role().expect("revertible status has a revert role");
        self.authorize(required, actor_role, "revert")?;

        self.status = to;

        self.record_event(Box::new(DefenseStatusReverted {
            defense_id: self.id.clone(),
            from,
            to,
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    /// Record a domain event
    pub fn record_event(&mut self, event: Box<dyn DomainEvent>) {
        self.events.push(event);
    }

    /// Get and clear all domain events
    pub fn take_events(&mut self) -> Vec<Box<dyn DomainEvent>> {
        std::mem::take(&mut self.events)
    }
}
