//! End-to-end tests for the defense workflow and its link to the
//! thesis workflow.

use std::time::Duration;

use chrono::Utc;
use gradflow_core::{
    CoreError, DefenseStatus, Role, StatusSweeper, SweeperConfig, ThesisStatus,
};
use gradflow_tests::TestHarness;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn completing_a_thesis_opens_exactly_one_defense() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .expect("defense auto-created on thesis completion");

    assert_eq!(defense.status, DefenseStatus::Unscheduled);
    assert_eq!(defense.student_id, harness.student.id);
    assert!(defense.defense_date.is_none());
    assert!(defense.grade.is_none());
}

#[tokio::test]
async fn repeating_submit_to_fenix_never_creates_a_second_defense() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    // The second submission fails the status guard ...
    let err = harness
        .thesis_service
        .submit_to_fenix(&thesis.id, Role::Staff)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    // ... and revert + resubmit walks the guard again without a
    // duplicate link appearing
    harness
        .thesis_service
        .revert_to_previous_state(&thesis.id, Role::Staff)
        .await
        .unwrap();
    harness
        .thesis_service
        .submit_to_fenix(&thesis.id, Role::Staff)
        .await
        .unwrap();

    assert_eq!(harness.defense_repo.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn schedule_defense_rejects_past_dates() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;
    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .unwrap();

    let err = harness
        .defense_service
        .update_defense_schedule(
            &defense.id,
            Utc::now() - chrono::Duration::hours(1),
            Role::Coordinator,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let stored = harness.defense_service.find_by_id(&defense.id).await.unwrap();
    assert_eq!(stored.status, DefenseStatus::Unscheduled);
}

#[tokio::test]
async fn schedule_defense_requires_a_completed_thesis() {
    let harness = TestHarness::new().await;
    let thesis = harness.submitted_thesis().await;

    let err = harness
        .defense_service
        .schedule_defense(
            &thesis.id,
            Utc::now() + chrono::Duration::days(30),
            Role::Coordinator,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn schedule_defense_conflicts_with_an_existing_link() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    // The auto-created defense already occupies the one-to-one link
    let err = harness
        .defense_service
        .schedule_defense(
            &thesis.id,
            Utc::now() + chrono::Duration::days(30),
            Role::Coordinator,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn update_schedule_promotes_an_unscheduled_defense() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;
    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .unwrap();

    let date = Utc::now() + chrono::Duration::days(14);
    let scheduled = harness
        .defense_service
        .update_defense_schedule(&defense.id, date, Role::Coordinator)
        .await
        .unwrap();

    assert_eq!(scheduled.status, DefenseStatus::DefenseScheduled);
    assert_eq!(scheduled.defense_date, Some(date));

    // A second scheduling pass is out of order
    let err = harness
        .defense_service
        .update_defense_schedule(&defense.id, date, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn grading_scenario() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;
    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .unwrap();

    harness
        .defense_service
        .update_defense_schedule(
            &defense.id,
            Utc::now() + chrono::Duration::days(14),
            Role::Coordinator,
        )
        .await
        .unwrap();

    // Grading a defense that is merely scheduled fails the state guard
    let err = harness
        .defense_service
        .assign_grade_and_submit(&defense.id, 17.0, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    harness
        .defense_service
        .set_under_review(&defense.id, Role::Coordinator)
        .await
        .unwrap();

    // Boundary grades
    let err = harness
        .defense_service
        .assign_grade_and_submit(&defense.id, -0.01, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let err = harness
        .defense_service
        .assign_grade_and_submit(&defense.id, 20.01, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let graded = harness
        .defense_service
        .assign_grade_and_submit(&defense.id, 20.00, Role::Coordinator)
        .await
        .unwrap();
    assert_eq!(graded.status, DefenseStatus::SubmittedToFenix);
    assert_eq!(graded.grade.unwrap().value(), 20.0);
}

#[tokio::test]
async fn defense_revert_chain_stops_at_scheduled() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;
    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .unwrap();

    harness
        .defense_service
        .update_defense_schedule(
            &defense.id,
            Utc::now() + chrono::Duration::days(14),
            Role::Coordinator,
        )
        .await
        .unwrap();
    harness
        .defense_service
        .set_under_review(&defense.id, Role::Coordinator)
        .await
        .unwrap();
    harness
        .defense_service
        .assign_grade_and_submit(&defense.id, 14.5, Role::Coordinator)
        .await
        .unwrap();

    let reverted = harness
        .defense_service
        .revert_to_previous_state(&defense.id, Role::Coordinator)
        .await
        .unwrap();
    assert_eq!(reverted.status, DefenseStatus::UnderReview);
    // Grade retained across the rewind
    assert!(reverted.grade.is_some());

    let reverted = harness
        .defense_service
        .revert_to_previous_state(&defense.id, Role::Coordinator)
        .await
        .unwrap();
    assert_eq!(reverted.status, DefenseStatus::DefenseScheduled);

    let err = harness
        .defense_service
        .revert_to_previous_state(&defense.id, Role::Coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn sweep_promotes_past_due_defenses_only() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;
    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .unwrap();

    // Backdate the scheduled defense directly in the store; the service
    // refuses past dates at the door.
    let mut past_due = defense.clone();
    past_due.status = DefenseStatus::DefenseScheduled;
    past_due.defense_date = Some(Utc::now() - chrono::Duration::hours(3));
    harness.defense_repo.save(&past_due).await.unwrap();

    // Reads never promote
    let read_back = harness.defense_service.find_by_id(&defense.id).await.unwrap();
    assert_eq!(read_back.status, DefenseStatus::DefenseScheduled);

    let promoted = harness
        .defense_service
        .update_defense_statuses(Role::Staff)
        .await
        .unwrap();
    assert_eq!(promoted, 1);

    let stored = harness.defense_service.find_by_id(&defense.id).await.unwrap();
    assert_eq!(stored.status, DefenseStatus::UnderReview);

    // Re-running is a no-op
    let promoted_again = harness
        .defense_service
        .update_defense_statuses(Role::Coordinator)
        .await
        .unwrap();
    assert_eq!(promoted_again, 0);
}

#[tokio::test]
async fn sweep_rejects_unauthorized_roles() {
    let harness = TestHarness::new().await;

    let err = harness
        .defense_service
        .update_defense_statuses(Role::Student)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));
}

#[tokio::test]
async fn periodic_sweeper_drives_the_promotion() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;
    let defense = harness
        .defense_service
        .find_by_thesis(&thesis.id)
        .await
        .unwrap()
        .unwrap();

    let mut past_due = defense.clone();
    past_due.status = DefenseStatus::DefenseScheduled;
    past_due.defense_date = Some(Utc::now() - chrono::Duration::minutes(5));
    harness.defense_repo.save(&past_due).await.unwrap();

    let sweeper = StatusSweeper::new(
        harness.defense_service.clone(),
        SweeperConfig {
            interval: Duration::from_millis(10),
        },
    );
    let handle = sweeper.spawn();

    // Give the loop a few ticks to run
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let stored = harness.defense_service.find_by_id(&defense.id).await.unwrap();
        if stored.status == DefenseStatus::UnderReview {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "sweeper never promoted the past-due defense"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn thesis_state_is_queryable_after_defense_opens() {
    let harness = TestHarness::new().await;
    let thesis = harness.thesis_at_fenix().await;

    // The triggering status write and the defense creation land together
    let stored_thesis = harness.thesis_service.find_by_id(&thesis.id).await.unwrap();
    assert_eq!(stored_thesis.status, ThesisStatus::SubmittedToFenix);
    assert_eq!(harness.defense_repo.find_all().await.unwrap().len(), 1);
}
