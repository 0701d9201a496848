//! People and roles as seen by the workflow engines.
//!
//! The person directory itself is an external collaborator; the core only
//! reads from it to check that an actor exists and holds the expected
//! role. The [`PersonDirectory`] trait is the full extent of that
//! contract.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Role held by an actor in the approval process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Degree coordinator
    Coordinator,

    /// Administrative staff
    Staff,

    /// Thesis student
    Student,

    /// Teacher, eligible for jury membership
    Teacher,

    /// Scientific committee
    ScientificCommittee,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coordinator => "COORDINATOR",
            Role::Staff => "STAFF",
            Role::Student => "STUDENT",
            Role::Teacher => "TEACHER",
            Role::ScientificCommittee => "SC",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "COORDINATOR" => Ok(Role::Coordinator),
            "STAFF" => Ok(Role::Staff),
            "STUDENT" => Ok(Role::Student),
            "TEACHER" => Ok(Role::Teacher),
            "SC" => Ok(Role::ScientificCommittee),
            other => Err(CoreError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Value object: Person ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonId(pub String);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An actor in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,

    /// Display name
    pub name: String,

    /// Unique external identifier
    pub external_id: String,

    /// Unique email address
    pub email: String,

    /// Role, immutable for the lifetime relevant to the workflows
    pub role: Role,
}

impl Person {
    /// True when this person holds the given role
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Read-only contract over the external person directory
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    /// Find a person by ID
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, CoreError>;

    /// Find a person by their unique external identifier
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Person>, CoreError>;

    /// List everyone holding the given role
    async fn find_by_role(&self, role: Role) -> Result<Vec<Person>, CoreError>;
}
