use crate::{
    domain::events::{
        DomainEvent, ThesisProposalSubmitted, ThesisStatusAdvanced, ThesisStatusReverted,
        ThesisSubmittedToFenix,
    },
    domain::person::{PersonId, Role},
    CoreError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Thesis workflow status
///
/// The five states form a single forward chain; every transition moves
/// exactly one step along it, forwards or backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ThesisStatus {
    /// Jury proposal submitted by the student
    ProposalSubmitted,

    /// Approved by the scientific committee
    ApprovedBySc,

    /// Jury president assigned by the coordinator
    JuryPresidentAssigned,

    /// Signed document uploaded by the coordinator
    DocumentSigned,

    /// Submitted to Fenix by staff (terminal)
    SubmittedToFenix,
}

impl ThesisStatus {
    /// All states in forward order
    pub const ALL: [ThesisStatus; 5] = [
        ThesisStatus::ProposalSubmitted,
        ThesisStatus::ApprovedBySc,
        ThesisStatus::JuryPresidentAssigned,
        ThesisStatus::DocumentSigned,
        ThesisStatus::SubmittedToFenix,
    ];

    /// Stable storage label for this status.
    ///
    /// These strings are the persisted encoding and must never change.
    pub fn label(&self) -> &'static str {
        match self {
            ThesisStatus::ProposalSubmitted => "Proposta de Júri Submetida",
            ThesisStatus::ApprovedBySc => "Aprovado pelo SC",
            ThesisStatus::JuryPresidentAssigned => "Presidente do Júri Atribuído",
            ThesisStatus::DocumentSigned => "Documento Assinado",
            ThesisStatus::SubmittedToFenix => "Submetido ao Fenix",
        }
    }

    /// Decode a status from its storage label
    pub fn from_label(value: &str) -> Result<Self, CoreError> {
        ThesisStatus::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown thesis status: {}", value)))
    }

    /// The status one step forward, if any
    pub fn next(&self) -> Option<ThesisStatus> {
        match self {
            ThesisStatus::ProposalSubmitted => Some(ThesisStatus::ApprovedBySc),
            ThesisStatus::ApprovedBySc => Some(ThesisStatus::JuryPresidentAssigned),
            ThesisStatus::JuryPresidentAssigned => Some(ThesisStatus::DocumentSigned),
            ThesisStatus::DocumentSigned => Some(ThesisStatus::SubmittedToFenix),
            ThesisStatus::SubmittedToFenix => None,
        }
    }

    /// Role allowed to advance a workflow out of this status
    pub fn advance_role(&self) -> Option<Role> {
        match self {
            ThesisStatus::ProposalSubmitted => Some(Role::ScientificCommittee),
            ThesisStatus::ApprovedBySc => Some(Role::Coordinator),
            ThesisStatus::JuryPresidentAssigned => Some(Role::Coordinator),
            ThesisStatus::DocumentSigned => Some(Role::Staff),
            ThesisStatus::SubmittedToFenix => None,
        }
    }

    /// The status one step back, if any
    pub fn previous(&self) -> Option<ThesisStatus> {
        match self {
            ThesisStatus::ProposalSubmitted => None,
            ThesisStatus::ApprovedBySc => Some(ThesisStatus::ProposalSubmitted),
            ThesisStatus::JuryPresidentAssigned => Some(ThesisStatus::ApprovedBySc),
            ThesisStatus::DocumentSigned => Some(ThesisStatus::JuryPresidentAssigned),
            ThesisStatus::SubmittedToFenix => Some(ThesisStatus::DocumentSigned),
        }
    }

    /// Role allowed to revert a workflow out of this status
    pub fn revert_role(&self) -> Option<Role> {
        match self {
            ThesisStatus::ProposalSubmitted => None,
            ThesisStatus::ApprovedBySc => Some(Role::ScientificCommittee),
            ThesisStatus::JuryPresidentAssigned => Some(Role::Coordinator),
            ThesisStatus::DocumentSigned => Some(Role::Coordinator),
            ThesisStatus::SubmittedToFenix => Some(Role::Staff),
        }
    }

    /// True for the terminal status
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for ThesisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThesisStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ThesisStatus::from_label(value)
    }
}

impl TryFrom<String> for ThesisStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ThesisStatus::from_label(&value)
    }
}

impl From<ThesisStatus> for String {
    fn from(status: ThesisStatus) -> Self {
        status.label().to_string()
    }
}

/// Value object: Thesis workflow ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThesisWorkflowId(pub String);

impl fmt::Display for ThesisWorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate: Thesis approval workflow
#[derive(Debug, Serialize, Deserialize)]
pub struct ThesisWorkflow {
    /// Unique identifier
    pub id: ThesisWorkflowId,

    /// Owning student
    pub student_id: PersonId,

    /// Current status
    pub status: ThesisStatus,

    /// Submission timestamp, set once at creation
    pub submission_date: DateTime<Utc>,

    /// Thesis title
    pub title: String,

    /// Jury members in proposal order, 1 to 5 teachers
    pub jury_member_ids: Vec<PersonId>,

    /// Jury president, always one of the jury members once set
    pub jury_president_id: Option<PersonId>,

    /// Path reference to the signed document
    pub document_path: Option<String>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,

    /// Domain events
    #[serde(skip)]
    pub events: Vec<Box<dyn DomainEvent>>,
}

// Manually implement Clone: domain events are not cloned
impl Clone for ThesisWorkflow {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            student_id: self.student_id.clone(),
            status: self.status,
            submission_date: self.submission_date,
            title: self.title.clone(),
            jury_member_ids: self.jury_member_ids.clone(),
            jury_president_id: self.jury_president_id.clone(),
            document_path: self.document_path.clone(),
            updated_at: self.updated_at,
            events: Vec::new(),
        }
    }
}

impl ThesisWorkflow {
    /// Create a new workflow in the initial status
    pub fn new(student_id: PersonId, title: String, jury_member_ids: Vec<PersonId>) -> Self {
        let id = ThesisWorkflowId(Uuid::new_v4().to_string());
        let now = Utc::now();

        let mut workflow = Self {
            id: id.clone(),
            student_id: student_id.clone(),
            status: ThesisStatus::ProposalSubmitted,
            submission_date: now,
            title,
            jury_member_ids,
            jury_president_id: None,
            document_path: None,
            updated_at: now,
            events: Vec::with_capacity(4),
        };

        workflow.record_event(Box::new(ThesisProposalSubmitted {
            thesis_id: id,
            student_id,
            timestamp: now,
        }));

        workflow
    }

    /// Update the timestamp
    #[inline]
    pub fn update_timestamp(&mut self) {
        self.updated_at = Utc::now();
    }

    /// True when the given person is on the jury list
    pub fn has_jury_member(&self, person_id: &PersonId) -> bool {
        self.jury_member_ids.contains(person_id)
    }

    // Guard + authorize a single forward step out of `expected`.
    fn advance_from(&mut self, expected: ThesisStatus, actor_role: Role) -> Result<(), CoreError> {
        if self.status != expected {
            return Err(CoreError::InvalidState(format!(
                "Cannot advance thesis {} in state: {:?}",
                self.id, self.status
            )));
        }

        let required = expected
            .advance_role()
            .expect("non-terminal status has an advance role");
        if actor_role != required {
            return Err(CoreError::Unauthorized(format!(
                "Role {} cannot advance thesis from {:?}",
                actor_role, expected
            )));
        }

        let to = expected.next().expect("non-terminal status has a successor");
        self.status = to;

        self.record_event(Box::new(ThesisStatusAdvanced {
            thesis_id: self.id.clone(),
            from: expected,
            to,
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    /// Approve the proposal (scientific committee action)
    pub fn approve_by_sc(&mut self, actor_role: Role) -> Result<(), CoreError> {
        self.advance_from(ThesisStatus::ProposalSubmitted, actor_role)
    }

    /// Assign the jury president (coordinator action)
    ///
    /// The president must already be on the jury list.
    pub fn assign_jury_president(
        &mut self,
        president_id: PersonId,
        actor_role: Role,
    ) -> Result<(), CoreError> {
        if self.status != ThesisStatus::ApprovedBySc {
            return Err(CoreError::InvalidState(format!(
                "Cannot assign jury president to thesis {} in state: {:?}",
                self.id, self.status
            )));
        }

        if !self.has_jury_member(&president_id) {
            return Err(CoreError::Validation(
                "Jury president must be a jury member".to_string(),
            ));
        }

        self.advance_from(ThesisStatus::ApprovedBySc, actor_role)?;
        self.jury_president_id = Some(president_id);
        Ok(())
    }

    /// Record the signed document path (coordinator action)
    pub fn upload_signed_document(
        &mut self,
        document_path: String,
        actor_role: Role,
    ) -> Result<(), CoreError> {
        self.advance_from(ThesisStatus::JuryPresidentAssigned, actor_role)?;
        self.document_path = Some(document_path);
        Ok(())
    }

    /// Submit to Fenix (staff action), completing the workflow
    pub fn submit_to_fenix(&mut self, actor_role: Role) -> Result<(), CoreError> {
        self.advance_from(ThesisStatus::DocumentSigned, actor_role)?;

        self.record_event(Box::new(ThesisSubmittedToFenix {
            thesis_id: self.id.clone(),
            student_id: self.student_id.clone(),
            timestamp: Utc::now(),
        }));

        Ok(())
    }

    /// Rewind the status one step.
    ///
    /// Accumulated fields (document path, jury president) are retained;
    /// only the status moves back.
    pub fn revert_to_previous_state(&mut self, actor_role: Role) -> Result<(), CoreError> {
        let from = self.status;

        let to = from.previous().ok_or_else(|| {
            CoreError::InvalidState(format!(
                "Cannot revert thesis {} from state: {:?}",
                self.id, from
            ))
        })?;

        let required = from.revert_role().expect("revertible status has a revert role");
        if actor_role != required {
            return Err(CoreError::Unauthorized(format!(
                "Role {} cannot revert thesis from {:?}",
                actor_role, from
            )));
        }

        self.status = to;

        self.record_event(Box::new(ThesisStatusReverted {
            thesis_id: self.id.clone(),
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
