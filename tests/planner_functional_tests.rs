//! Functional tests for batch auto-placement, including the async job path.

mod support;

use std::sync::Arc;
use std::time::Duration;

use timetable_rust::api::{ClassGroupId, LecturerId, SubjectId};
use timetable_rust::db::repositories::LocalRepository;
use timetable_rust::db::repository::SlotRepository;
use timetable_rust::models::DayOfWeek;
use timetable_rust::scheduler::conflict::conflict_for;
use timetable_rust::scheduler::planner::{place_batch, CancelToken, PlacementRequest};
use timetable_rust::services::batch_processor::process_batch_async;
use timetable_rust::services::job_tracker::{JobStatus, JobTracker};

use support::{catalog, seeded_repo, single_room_catalog, SEMESTER};

fn request(class: i64, lecturer: i64, periods: u32) -> PlacementRequest {
    PlacementRequest {
        class_group_id: ClassGroupId::new(class),
        subject_id: SubjectId::new(1),
        lecturer_id: LecturerId::new(lecturer),
        room_kind_hint: "theory".to_string(),
        period_count: periods,
    }
}

#[tokio::test]
async fn contended_room_is_never_double_booked() {
    // Two classes both need a Theory room seating >= 40; only A101 exists.
    let repo = LocalRepository::with_catalog(single_room_catalog());
    let catalog = single_room_catalog();

    let result = place_batch(
        &repo,
        &catalog,
        vec![request(1, 1, 2), request(1, 2, 2)],
        SEMESTER,
        &CancelToken::new(),
    )
    .await
    .unwrap();

    // Class 1 cannot attend two offerings at once, so the second request
    // shifts to the next start time and both fit into A101. Now contend the
    // room itself: distinct classes, same seat requirement, saturated grid.
    assert_eq!(result.placed.len(), 2);
    let slots = repo.snapshot_slots().await.unwrap();
    assert_ne!(
        (slots[0].day, slots[0].start),
        (slots[1].day, slots[1].start)
    );
}

#[tokio::test]
async fn one_room_two_classes_second_fails_when_grid_is_full() {
    // Saturate A101 for class 1 / lecturer 1 (24 slots fill every candidate
    // window Monday..Saturday), then ask for one more placement needing the
    // same room for a different class.
    let repo = LocalRepository::with_catalog(single_room_catalog());
    let catalog = single_room_catalog();

    let fill: Vec<PlacementRequest> = (0..24).map(|_| request(1, 1, 2)).collect();
    let filled = place_batch(&repo, &catalog, fill, SEMESTER, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(filled.placed.len(), 24);

    let result = place_batch(
        &repo,
        &catalog,
        vec![request(2, 2, 2)],
        SEMESTER,
        &CancelToken::new(),
    )
    .await
    .unwrap();

    assert!(result.placed.is_empty());
    assert_eq!(result.failed.len(), 1);
    assert!(result.failed[0].reason.contains("no free day/time/room"));
    // The room was never assigned twice in one window.
    let slots = repo.snapshot_slots().await.unwrap();
    for slot in &slots {
        assert!(conflict_for(&slot.as_new(), slots.iter(), Some(slot.id)).is_none());
    }
}

#[tokio::test]
async fn batch_commits_survive_later_failures() {
    let repo = seeded_repo();
    let catalog = catalog();

    let result = place_batch(
        &repo,
        &catalog,
        vec![request(1, 1, 2), request(99, 1, 2), request(2, 2, 2)],
        SEMESTER,
        &CancelToken::new(),
    )
    .await
    .unwrap();

    // The unknown class fails, the requests around it still commit.
    assert_eq!(result.placed.len(), 2);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(repo.snapshot_slots().await.unwrap().len(), 2);
}

#[tokio::test]
async fn earlier_requests_have_placement_priority() {
    let repo = seeded_repo();
    let catalog = catalog();

    let result = place_batch(
        &repo,
        &catalog,
        vec![request(1, 1, 2), request(2, 1, 2)],
        SEMESTER,
        &CancelToken::new(),
    )
    .await
    .unwrap();

    // First request gets Monday 07:00; the shared lecturer pushes the
    // second to Monday 09:00.
    assert_eq!(result.placed[0].class_group_id, ClassGroupId::new(1));
    assert_eq!(result.placed[0].day, DayOfWeek::Monday);
    assert_eq!(result.placed[0].start, support::time(7, 0));
    assert_eq!(result.placed[1].start, support::time(9, 0));
}

#[tokio::test]
async fn pairwise_invariants_hold_after_large_batch() {
    let repo = seeded_repo();
    let catalog = catalog();

    let mut requests = Vec::new();
    for i in 0..30 {
        requests.push(request(1 + (i % 2), 1 + (i % 2), 1 + (i % 3) as u32));
    }
    place_batch(&repo, &catalog, requests, SEMESTER, &CancelToken::new())
        .await
        .unwrap();

    let slots = repo.snapshot_slots().await.unwrap();
    assert!(!slots.is_empty());
    for slot in &slots {
        assert!(
            conflict_for(&slot.as_new(), slots.iter(), Some(slot.id)).is_none(),
            "batch committed conflicting slot {}",
            slot.id
        );
    }
}

// ---------------------------------------------------------------------------
// Async job wrapper
// ---------------------------------------------------------------------------

async fn wait_for_terminal(tracker: &JobTracker, job_id: &str) -> JobStatus {
    for _ in 0..50 {
        if let Some(job) = tracker.get_job(job_id) {
            if job.status.is_terminal() {
                return job.status;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {} never reached a terminal status", job_id);
}

#[tokio::test]
async fn batch_job_completes_with_summary() {
    let repo: Arc<dyn timetable_rust::db::repository::FullRepository> = Arc::new(seeded_repo());
    let tracker = JobTracker::new();
    let job_id = tracker.create_job();

    let result = process_batch_async(
        job_id.clone(),
        tracker.clone(),
        Arc::clone(&repo),
        vec![request(1, 1, 2), request(99, 1, 2)],
        SEMESTER.to_string(),
    )
    .await
    .unwrap();

    assert_eq!(result.placed.len(), 1);
    assert_eq!(result.failed.len(), 1);

    let job = tracker.get_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    let summary = job.result.unwrap();
    assert_eq!(summary["placed"], 1);
    assert_eq!(summary["failed"], 1);
    assert!(!job.logs.is_empty());
}

#[tokio::test]
async fn cancelled_job_reports_cancelled_status() {
    let repo: Arc<dyn timetable_rust::db::repository::FullRepository> = Arc::new(seeded_repo());
    let tracker = JobTracker::new();
    let job_id = tracker.create_job();

    // Cancel before the worker starts: nothing may be placed.
    assert!(tracker.request_cancel(&job_id));

    let worker = tokio::spawn(process_batch_async(
        job_id.clone(),
        tracker.clone(),
        Arc::clone(&repo),
        vec![request(1, 1, 2), request(2, 2, 2)],
        SEMESTER.to_string(),
    ));

    let status = wait_for_terminal(&tracker, &job_id).await;
    assert_eq!(status, JobStatus::Cancelled);
    worker.await.unwrap().unwrap();
    assert!(repo.snapshot_slots().await.unwrap().is_empty());
}
