//! Shared harness for the gradflow integration tests.
//!
//! Wires the two workflow engines over in-memory stores the way a
//! deployment would, with a seeded person directory.

use std::sync::Arc;

use gradflow_core::{
    DefenseWorkflowRepository, DefenseWorkflowService, EntityLocks, LoggingEventHandler, Person,
    PersonId, Role, ThesisCompletionHandler, ThesisWorkflow, ThesisWorkflowRepository,
    ThesisWorkflowService,
};
use gradflow_state_inmemory::{InMemoryPersonDirectory, InMemoryStoreProvider};

/// Fully wired engines over in-memory state, with a seeded directory.
pub struct TestHarness {
    /// The person directory behind the engines
    pub directory: Arc<InMemoryPersonDirectory>,

    /// Thesis workflow engine
    pub thesis_service: Arc<ThesisWorkflowService>,

    /// Defense workflow engine
    pub defense_service: Arc<DefenseWorkflowService>,

    /// Direct repository access for test setup and assertions
    pub thesis_repo: Arc<dyn ThesisWorkflowRepository>,

    /// Direct repository access for test setup and assertions
    pub defense_repo: Arc<dyn DefenseWorkflowRepository>,

    /// Seeded student
    pub student: Person,

    /// A second seeded student
    pub other_student: Person,

    /// Five seeded teachers
    pub teachers: Vec<Person>,
}

impl TestHarness {
    /// Build the harness and seed the directory
    pub async fn new() -> Self {
        let directory = Arc::new(InMemoryPersonDirectory::new());
        let provider = InMemoryStoreProvider::new();
        let (thesis_repo, defense_repo) = provider.create_repositories();
        let entity_locks = Arc::new(EntityLocks::new());

        let defense_service = Arc::new(DefenseWorkflowService::new(
            defense_repo.clone(),
            thesis_repo.clone(),
            Arc::new(LoggingEventHandler),
            entity_locks.clone(),
        ));

        let thesis_service = Arc::new(ThesisWorkflowService::new(
            thesis_repo.clone(),
            directory.clone(),
            Arc::new(ThesisCompletionHandler::new(defense_service.clone())),
            entity_locks,
        ));

        let student = directory
            .register("Ana Martins", "ist100001", "ana@example.edu", Role::Student)
            .await
            .unwrap();
        let other_student = directory
            .register("Rui Costa", "ist100002", "rui@example.edu", Role::Student)
            .await
            .unwrap();

        let mut teachers = Vec::new();
        for index in 0..5 {
            let teacher = directory
                .register(
                    &format!("Teacher {}", index + 1),
                    &format!("ist20000{}", index + 1),
                    &format!("teacher{}@example.edu", index + 1),
                    Role::Teacher,
                )
                .await
                .unwrap();
            teachers.push(teacher);
        }

        Self {
            directory,
            thesis_service,
            defense_service,
            thesis_repo,
            defense_repo,
            student,
            other_student,
            teachers,
        }
    }

    /// The first `count` seeded teacher ids
    pub fn jury(&self, count: usize) -> Vec<PersonId> {
        self.teachers
            .iter()
            .take(count)
            .map(|teacher| teacher.id.clone())
            .collect()
    }

    /// Submit a proposal for the seeded student
    pub async fn submitted_thesis(&self) -> ThesisWorkflow {
        self.thesis_service
            .submit_jury_proposal(&self.student.id, "Adaptive Query Planning", self.jury(3))
            .await
            .unwrap()
    }

    /// Drive a fresh proposal through every gate to Fenix
    pub async fn thesis_at_fenix(&self) -> ThesisWorkflow {
        let thesis = self.submitted_thesis().await;
        self.thesis_service
            .approve_by_scientific_committee(&thesis.id, Role::ScientificCommittee)
            .await
            .unwrap();
        self.thesis_service
            .assign_jury_president(&thesis.id, &self.teachers[0].id, Role::Coordinator)
            .await
            .unwrap();
        self.thesis_service
            .upload_signed_document(&thesis.id, "/signed/jury.pdf", Role::Coordinator)
            .await
            .unwrap();
        self.thesis_service
            .submit_to_fenix(&thesis.id, Role::Staff)
            .await
            .unwrap()
    }
}
