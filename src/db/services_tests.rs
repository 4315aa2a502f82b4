use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use parking_lot::Mutex;

use super::*;
use crate::api::{ClassGroupId, LecturerId, RoomId, SubjectId};
use crate::db::repositories::LocalRepository;
use crate::db::repository::{CatalogRepository, SlotRepository};
use crate::models::{ClassGroup, DayOfWeek, Lecturer, Room, RoomKind, Subject};
use crate::scheduler::conflict::ConflictAxis;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot {
        rooms: vec![Room {
            id: RoomId::new(1),
            name: "A101".to_string(),
            capacity: 40,
            kind: RoomKind::Theory,
        }],
        lecturers: vec![
            Lecturer {
                id: LecturerId::new(1),
                full_name: "L1".to_string(),
            },
            Lecturer {
                id: LecturerId::new(2),
                full_name: "L2".to_string(),
            },
        ],
        class_groups: vec![ClassGroup {
            id: ClassGroupId::new(1),
            name: "C1".to_string(),
            academic_year: None,
            max_headcount: 40,
        }],
        subjects: vec![Subject {
            id: SubjectId::new(1),
            name: "Math".to_string(),
        }],
    }
}

fn new_slot(lecturer: i64, start: (u32, u32), end: (u32, u32)) -> NewSlot {
    NewSlot {
        class_group_id: ClassGroupId::new(1),
        subject_id: SubjectId::new(1),
        room_id: RoomId::new(1),
        lecturer_id: LecturerId::new(lecturer),
        day: DayOfWeek::Monday,
        start: time(start.0, start.1),
        end: time(end.0, end.1),
        semester: "HK1-2025".to_string(),
    }
}

/// Notifier that records every change it is handed.
#[derive(Default)]
struct RecordingNotifier {
    changes: Mutex<Vec<ScheduleChange>>,
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn slot_changed(&self, change: ScheduleChange) {
        self.changes.lock().push(change);
    }
}

/// Repository whose inserts fail transiently a fixed number of times.
struct FlakyRepository {
    inner: LocalRepository,
    failures_left: AtomicU32,
}

impl FlakyRepository {
    fn failing(times: u32) -> Self {
        Self {
            inner: LocalRepository::with_catalog(catalog()),
            failures_left: AtomicU32::new(times),
        }
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SlotRepository for FlakyRepository {
    async fn insert_slot(&self, slot: NewSlot) -> RepositoryResult<WeeklySlot> {
        if self.take_failure() {
            return Err(RepositoryError::connection("simulated write contention"));
        }
        self.inner.insert_slot(slot).await
    }

    async fn update_slot(&self, id: SlotId, slot: NewSlot) -> RepositoryResult<WeeklySlot> {
        self.inner.update_slot(id, slot).await
    }

    async fn delete_slot(&self, id: SlotId) -> RepositoryResult<WeeklySlot> {
        self.inner.delete_slot(id).await
    }

    async fn get_slot(&self, id: SlotId) -> RepositoryResult<WeeklySlot> {
        self.inner.get_slot(id).await
    }

    async fn snapshot_slots(&self) -> RepositoryResult<Vec<WeeklySlot>> {
        self.inner.snapshot_slots().await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl CatalogRepository for FlakyRepository {
    async fn catalog_snapshot(&self) -> RepositoryResult<CatalogSnapshot> {
        self.inner.catalog_snapshot().await
    }

    async fn replace_catalog(&self, catalog: CatalogSnapshot) -> RepositoryResult<()> {
        self.inner.replace_catalog(catalog).await
    }
}

#[tokio::test]
async fn create_commits_and_notifies_once() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let stored = create_slot(&repo, &notifier, new_slot(1, (7, 0), (9, 0)))
        .await
        .unwrap();

    assert_eq!(repo.snapshot_slots().await.unwrap().len(), 1);
    let changes = notifier.changes.lock();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Created);
    assert_eq!(changes[0].slot_id, stored.id);
    assert!(changes[0].description.contains("Math"));
    assert!(changes[0].description.contains("A101"));
}

#[tokio::test]
async fn invalid_range_is_rejected_before_conflict_check() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let err = create_slot(&repo, &notifier, new_slot(1, (9, 0), (7, 0)))
        .await
        .unwrap_err();

    assert!(matches!(err, ScheduleError::Validation(_)));
    assert!(repo.snapshot_slots().await.unwrap().is_empty());
    assert!(notifier.changes.lock().is_empty());
}

#[tokio::test]
async fn unknown_reference_is_a_validation_error() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let mut slot = new_slot(1, (7, 0), (9, 0));
    slot.room_id = RoomId::new(99);
    let err = create_slot(&repo, &notifier, slot).await.unwrap_err();

    match err {
        ScheduleError::Validation(msg) => assert!(msg.contains("room 99")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn conflicting_create_reports_axis_and_notifies_nothing() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    create_slot(&repo, &notifier, new_slot(1, (7, 0), (9, 0)))
        .await
        .unwrap();
    // Same room, different lecturer: room axis.
    let err = create_slot(&repo, &notifier, new_slot(2, (8, 0), (10, 0)))
        .await
        .unwrap_err();

    match err {
        ScheduleError::Conflict(conflict) => assert_eq!(conflict.axis, ConflictAxis::Room),
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(notifier.changes.lock().len(), 1);
}

#[tokio::test]
async fn edit_excludes_itself_from_the_conflict_check() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let stored = create_slot(&repo, &notifier, new_slot(1, (7, 0), (9, 0)))
        .await
        .unwrap();
    // Shrinking the same slot overlaps its own old range; that must pass.
    let edited = edit_slot(&repo, &notifier, stored.id, new_slot(1, (7, 0), (8, 0)))
        .await
        .unwrap();

    assert_eq!(edited.end, time(8, 0));
    assert_eq!(notifier.changes.lock().len(), 2);
}

#[tokio::test]
async fn edit_missing_slot_is_not_found() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let err = edit_slot(
        &repo,
        &notifier,
        SlotId::new(42),
        new_slot(1, (7, 0), (9, 0)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ScheduleError::NotFound(_)));
}

#[tokio::test]
async fn delete_notifies_with_removed_slot_details() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let stored = create_slot(&repo, &notifier, new_slot(1, (7, 0), (9, 0)))
        .await
        .unwrap();
    delete_slot(&repo, &notifier, stored.id).await.unwrap();

    assert!(repo.snapshot_slots().await.unwrap().is_empty());
    let changes = notifier.changes.lock();
    assert_eq!(changes.last().map(|c| c.kind), Some(ChangeKind::Deleted));
}

#[tokio::test]
async fn delete_missing_slot_is_not_found() {
    let repo = LocalRepository::with_catalog(catalog());
    let notifier = RecordingNotifier::default();

    let err = delete_slot(&repo, &notifier, SlotId::new(7)).await.unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(_)));
}

#[tokio::test]
async fn transient_failures_are_retried_then_succeed() {
    let repo = FlakyRepository::failing(2);
    let notifier = RecordingNotifier::default();

    let stored = create_slot(&repo, &notifier, new_slot(1, (7, 0), (9, 0)))
        .await
        .unwrap();

    assert_eq!(stored.id.value(), 1);
    assert_eq!(repo.snapshot_slots().await.unwrap().len(), 1);
}

#[tokio::test]
async fn persistent_failures_surface_as_storage_error() {
    let repo = FlakyRepository::failing(u32::MAX);
    let notifier = RecordingNotifier::default();

    let err = create_slot(&repo, &notifier, new_slot(1, (7, 0), (9, 0)))
        .await
        .unwrap_err();

    assert!(matches!(err, ScheduleError::Storage(_)));
    assert!(notifier.changes.lock().is_empty());
}

#[tokio::test]
async fn concurrent_creates_for_same_room_commit_exactly_once() {
    let repo = Arc::new(LocalRepository::with_catalog(catalog()));

    let mut handles = Vec::new();
    for lecturer in 1..=2 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            let notifier = RecordingNotifier::default();
            create_slot(repo.as_ref(), &notifier, new_slot(lecturer, (7, 0), (9, 0))).await
        }));
    }

    let mut committed = 0;
    let mut conflicted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(ScheduleError::Conflict(_)) => conflicted += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(conflicted, 1);
    assert_eq!(repo.snapshot_slots().await.unwrap().len(), 1);
}
