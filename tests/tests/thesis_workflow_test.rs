//! End-to-end tests for the thesis approval workflow.

use gradflow_core::{CoreError, PersonId, Role, ThesisStatus};
use gradflow_tests::TestHarness;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn proposal_validation_scenario() {
    let harness = TestHarness::new().await;

    // Six jury members: validation error, no record created
    let err = harness
        .thesis_service
        .submit_jury_proposal(
            &harness.student.id,
            "AI Systems",
            vec![
                harness.teachers[0].id.clone(),
                harness.teachers[1].id.clone(),
                harness.teachers[2].id.clone(),
                harness.teachers[3].id.clone(),
                harness.teachers[4].id.clone(),
                PersonId("teacher-6".to_string()),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(harness.thesis_repo.find_all().await.unwrap().is_empty());

    // Two-character title: validation error
    let err = harness
        .thesis_service
        .submit_jury_proposal(&harness.student.id, "AI", harness.jury(3))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(harness.thesis_repo.find_all().await.unwrap().is_empty());

    // Valid resubmission with the same jury succeeds
    let thesis = harness
        .thesis_service
        .submit_jury_proposal(&harness.student.id, "AI Systems", harness.jury(3))
        .await
        .unwrap();
    assert_eq!(thesis.status, ThesisStatus::ProposalSubmitted);
    assert_eq!(thesis.jury_member_ids, harness.jury(3));
}

#[tokio::test]
async fn title_is_trimmed_before_length_check() {
    let harness = TestHarness::new().await;

    let err = harness
        .thesis_service
        .submit_jury_proposal(&harness.student.id, "  AI   ", harness.jury(1))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn unknown_student_is_not_found() {
    let harness = TestHarness::new().await;

    let err = harness
        .thesis_service
        .submit_jury_proposal(
            &PersonId("nobody".to_string()),
            "Valid Title",
            harness.jury(2),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn teacher_cannot_submit_a_proposal() {
    let harness = TestHarness::new().await;

    let err = harness
        .thesis_service
        .submit_jury_proposal(&harness.teachers[0].id, "Valid Title", harness.jury(2))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn unresolved_jury_member_fails_the_whole_call() {
    let harness = TestHarness::new().await;

    let mut jury = harness.jury(2);
    jury.push(PersonId("ghost-teacher".to_string()));

    let err = harness
        .thesis_service
        .submit_jury_proposal(&harness.student.id, "Valid Title", jury)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
    assert!(harness.thesis_repo.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_teacher_jury_member_is_rejected() {
    let harness = TestHarness::new().await;

    let mut jury = harness.jury(2);
    jury.push(harness.other_student.id.clone());

    let err = harness
        .thesis_service
        .submit_jury_proposal(&harness.student.id, "Valid Title", jury)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn second_proposal_for_same_student_conflicts() {
    let harness = TestHarness::new().await;

    harness.submitted_thesis().await;
    let err = harness
        .thesis_service
        .submit_jury_proposal(&harness.student.id, "Another Topic", harness.jury(2))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    // A different student is unaffected
    harness
        .thesis_service
        .submit_jury_proposal(&harness.other_student.id, "Another Topic", harness.jury(2))
        .await
        .unwrap();
}

#[tokio::test]
async fn jury_president_scenario() {
    let harness = TestHarness::new().await;
    let thesis = harness.submitted_thesis().await;

    harness
        .thesis_service
        .approve_by_scientific_committee(&thesis.id, Role::ScientificCommittee)
        .await
        .unwrap();

    // A teacher outside the jury list cannot preside
    let err = harness
        .thesis_service
        .assign_jury_president(&thesis.id, &harness.teachers[4].id, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // A jury member can
    let thesis = harness
        .thesis_service
        .assign_jury_president(&thesis.id, &harness.teachers[1].id, Role::Coordinator)
        .await
        .unwrap();
    assert_eq!(thesis.status, ThesisStatus::JuryPresidentAssigned);
    assert_eq!(thesis.jury_president_id, Some(harness.teachers[1].id.clone()));
}

#[tokio::test]
async fn forward_transitions_require_the_gated_role() {
    let harness = TestHarness::new().await;
    let thesis = harness.submitted_thesis().await;

    let err = harness
        .thesis_service
        .approve_by_scientific_committee(&thesis.id, Role::Staff)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    // Status is untouched after the failed attempt
    let stored = harness.thesis_service.find_by_id(&thesis.id).await.unwrap();
    assert_eq!(stored.status, ThesisStatus::ProposalSubmitted);
}

#[tokio::test]
async fn full_approval_chain_reaches_fenix() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    assert_eq!(thesis.status, ThesisStatus::SubmittedToFenix);
    assert_eq!(thesis.document_path.as_deref(), Some("/signed/jury.pdf"));

    let by_status = harness
        .thesis_service
        .find_by_status(ThesisStatus::SubmittedToFenix)
        .await
        .unwrap();
    assert_eq!(by_status.len(), 1);

    let by_student = harness
        .thesis_service
        .find_by_student(&harness.student.id)
        .await
        .unwrap();
    assert_eq!(by_student.unwrap().id, thesis.id);
}

#[tokio::test]
async fn revert_is_the_exact_inverse_walk() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    let steps = [
        (Role::Staff, ThesisStatus::DocumentSigned),
        (Role::Coordinator, ThesisStatus::JuryPresidentAssigned),
        (Role::Coordinator, ThesisStatus::ApprovedBySc),
        (Role::ScientificCommittee, ThesisStatus::ProposalSubmitted),
    ];

    for (role, expected) in steps {
        let reverted = harness
            .thesis_service
            .revert_to_previous_state(&thesis.id, role)
            .await
            .unwrap();
        assert_eq!(reverted.status, expected);
    }

    // No prior state left to rewind to
    let err = harness
        .thesis_service
        .revert_to_previous_state(&thesis.id, Role::ScientificCommittee)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    // Accumulated fields survived the full rewind
    let stored = harness.thesis_service.find_by_id(&thesis.id).await.unwrap();
    assert!(stored.document_path.is_some());
    assert!(stored.jury_president_id.is_some());
}

#[tokio::test]
async fn revert_requires_the_state_dependent_role() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    let err = harness
        .thesis_service
        .revert_to_previous_state(&thesis.id, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
}

#[tokio::test]
async fn rejected_proposal_is_hard_deleted() {
    let harness = TestHarness::new().await;
    let thesis = harness.submitted_thesis().await;

    harness
        .thesis_service
        .reject_thesis_proposal(
            &thesis.id,
            Role::ScientificCommittee,
            Some("Jury too narrow".to_string()),
        )
        .await
        .unwrap();

    let err = harness
        .thesis_service
        .find_by_id(&thesis.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    // The student can resubmit after the rejection
    harness.submitted_thesis().await;
}

#[tokio::test]
async fn reject_only_applies_to_fresh_proposals() {
    let harness = TestHarness::new().await;
    let thesis = harness.submitted_thesis().await;

    harness
        .thesis_service
        .approve_by_scientific_committee(&thesis.id, Role::ScientificCommittee)
        .await
        .unwrap();

    let err = harness
        .thesis_service
        .reject_thesis_proposal(&thesis.id, Role::ScientificCommittee, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}
