use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use gradflow_core::{CoreError, Person, PersonDirectory, PersonId, Role};

/// In-memory person directory.
///
/// The workflow engines only read through the [`PersonDirectory`]
/// trait; registration is an out-of-trait concern of this
/// implementation and enforces the directory's uniqueness rules on
/// external id and email.
pub struct InMemoryPersonDirectory {
    people: Arc<RwLock<HashMap<String, Person>>>,
}

impl InMemoryPersonDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            people: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a person, assigning a fresh identifier.
    ///
    /// Fails with Conflict when the external id or email is taken.
    pub async fn register(
        &self,
        name: &str,
        external_id: &str,
        email: &str,
        role: Role,
    ) -> Result<Person, CoreError> {
        let mut people = self.people.write().await;

        if people.values().any(|p| p.external_id == external_id) {
            return Err(CoreError::Conflict(format!(
                "A person with external id {} already exists",
                external_id
            )));
        }
        if people.values().any(|p| p.email == email) {
            return Err(CoreError::Conflict(format!(
                "A person with email {} already exists",
                email
            )));
        }

        let person = Person {
            id: PersonId(Uuid::new_v4().to_string()),
            name: name.to_string(),
            external_id: external_id.to_string(),
            email: email.to_string(),
            role,
        };
        people.insert(person.id.0.clone(), person.clone());
        debug!(person_id = %person.id, %role, "registered person");
        Ok(person)
    }
}

impl Default for InMemoryPersonDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonDirectory for InMemoryPersonDirectory {
    async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, CoreError> {
        let people = self.people.read().await;
        Ok(people.get(&id.0).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Person>, CoreError> {
        let people = self.people.read().await;
        Ok(people
            .values()
            .find(|person| person.external_id == external_id)
            .cloned())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<Person>, CoreError> {
        let people = self.people.read().await;
        Ok(people
            .values()
            .filter(|person| person.role == role)
            .cloned()
            .collect())
    }
}
