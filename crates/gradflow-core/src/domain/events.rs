use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::domain::defense::{DefenseStatus, DefenseWorkflowId, Grade};
use crate::domain::person::PersonId;
use crate::domain::thesis::{ThesisStatus, ThesisWorkflowId};

/// Domain event trait for all events in the system
pub trait DomainEvent: Debug + Send + Sync {
    /// Returns the type of the event as a string
    fn event_type(&self) -> &'static str;

    /// Returns the identifier of the workflow this event belongs to
    fn aggregate_id(&self) -> &str;

    /// Returns the timestamp when the event occurred
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Event: a student submitted a jury proposal
#[derive(Debug)]
pub struct ThesisProposalSubmitted {
    /// The identifier of the new thesis workflow
    pub thesis_id: ThesisWorkflowId,

    /// The owning student
    pub student_id: PersonId,

    /// The timestamp when the proposal was submitted
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThesisProposalSubmitted {
    fn event_type(&self) -> &'static str {
        "thesis.proposal_submitted"
    }

    fn aggregate_id(&self) -> &str {
        &self.thesis_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a thesis workflow advanced one step forward
#[derive(Debug)]
pub struct ThesisStatusAdvanced {
    /// The identifier of the thesis workflow
    pub thesis_id: ThesisWorkflowId,

    /// The status the workflow left
    pub from: ThesisStatus,

    /// The status the workflow entered
    pub to: ThesisStatus,

    /// The timestamp when the transition happened
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThesisStatusAdvanced {
    fn event_type(&self) -> &'static str {
        "thesis.status_advanced"
    }

    fn aggregate_id(&self) -> &str {
        &self.thesis_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a thesis workflow reached its terminal state
///
/// The defense workflow engine consumes this to open the linked defense.
#[derive(Debug)]
pub struct ThesisSubmittedToFenix {
    /// The identifier of the completed thesis workflow
    pub thesis_id: ThesisWorkflowId,

    /// The owning student
    pub student_id: PersonId,

    /// The timestamp when the thesis was submitted
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThesisSubmittedToFenix {
    fn event_type(&self) -> &'static str {
        "thesis.submitted_to_fenix"
    }

    fn aggregate_id(&self) -> &str {
        &self.thesis_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a thesis workflow was reverted one step
#[derive(Debug)]
pub struct ThesisStatusReverted {
    /// The identifier of the thesis workflow
    pub thesis_id: ThesisWorkflowId,

    /// The status the workflow left
    pub from: ThesisStatus,

    /// The status the workflow rewound to
    pub to: ThesisStatus,

    /// The timestamp when the revert happened
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThesisStatusReverted {
    fn event_type(&self) -> &'static str {
        "thesis.status_reverted"
    }

    fn aggregate_id(&self) -> &str {
        &self.thesis_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a proposal was rejected and the workflow deleted
#[derive(Debug)]
pub struct ThesisProposalRejected {
    /// The identifier of the deleted thesis workflow
    pub thesis_id: ThesisWorkflowId,

    /// Reviewer comments, if any
    pub comments: Option<String>,

    /// The timestamp when the proposal was rejected
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThesisProposalRejected {
    fn event_type(&self) -> &'static str {
        "thesis.proposal_rejected"
    }

    fn aggregate_id(&self) -> &str {
        &self.thesis_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a defense workflow was opened for a completed thesis
#[derive(Debug)]
pub struct DefenseOpened {
    /// The identifier of the new defense workflow
    pub defense_id: DefenseWorkflowId,

    /// The completed thesis this defense belongs to
    pub thesis_id: ThesisWorkflowId,

    /// The timestamp when the defense was opened
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for DefenseOpened {
    fn event_type(&self) -> &'static str {
        "defense.opened"
    }

    fn aggregate_id(&self) -> &str {
        &self.defense_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a defense was scheduled
#[derive(Debug)]
pub struct DefenseScheduled {
    /// The identifier of the defense workflow
    pub defense_id: DefenseWorkflowId,

    /// The scheduled defense date
    pub defense_date: DateTime<Utc>,

    /// The timestamp when the scheduling happened
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for DefenseScheduled {
    fn event_type(&self) -> &'static str {
        "defense.scheduled"
    }

    fn aggregate_id(&self) -> &str {
        &self.defense_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a defense moved to review, manually or by the sweep
#[derive(Debug)]
pub struct DefenseUnderReview {
    /// The identifier of the defense workflow
    pub defense_id: DefenseWorkflowId,

    /// The timestamp when the transition happened
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for DefenseUnderReview {
    fn event_type(&self) -> &'static str {
        "defense.under_review"
    }

    fn aggregate_id(&self) -> &str {
        &self.defense_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a defense was graded and submitted
#[derive(Debug)]
pub struct DefenseGraded {
    /// The identifier of the defense workflow
    pub defense_id: DefenseWorkflowId,

    /// The assigned grade
    pub grade: Grade,

    /// The timestamp when the grade was assigned
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for DefenseGraded {
    fn event_type(&self) -> &'static str {
        "defense.graded"
    }

    fn aggregate_id(&self) -> &str {
        &self.defense_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Event: a defense workflow was reverted one step
#[derive(Debug)]
pub struct DefenseStatusReverted {
    /// The identifier of the defense workflow
    pub defense_id: DefenseWorkflowId,

    /// The status the workflow left
    pub from: DefenseStatus,

    /// The status the workflow rewound to
    pub to: DefenseStatus,

    /// The timestamp when the revert happened
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for DefenseStatusReverted {
    fn event_type(&self) -> &'static str {
        "defense.status_reverted"
    }

    fn aggregate_id(&self) -> &str {
        &self.defense_id.0
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
