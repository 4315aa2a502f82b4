//! Integration tests for the query façade: history window, upcoming
//! sessions, current week, and free-resource suggestions.

mod support;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use timetable_rust::api::{ClassGroupId, DayOfWeek, LecturerId, RoomId};
use timetable_rust::db::services::create_slot;
use timetable_rust::services::queries::{
    current_week, free_resources, history_window, list_slots, upcoming, SlotFilter,
};
use timetable_rust::services::TracingNotifier;

use support::{seeded_repo, slot_request, time, SEMESTER};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Monday 2025-06-02.
const ANCHOR: fn() -> NaiveDate = || date(2025, 6, 2);

async fn seeded_with_slots() -> timetable_rust::db::repositories::LocalRepository {
    let repo = seeded_repo();
    // C1 / L1: Monday 07:00-09:00 in A101.
    create_slot(
        &repo,
        &TracingNotifier,
        slot_request(1, 1, 1, DayOfWeek::Monday, time(7, 0), time(9, 0)),
    )
    .await
    .unwrap();
    // C2 / L2: Wednesday 13:00-15:00 in A102.
    create_slot(
        &repo,
        &TracingNotifier,
        slot_request(2, 2, 2, DayOfWeek::Wednesday, time(13, 0), time(15, 0)),
    )
    .await
    .unwrap();
    repo
}

#[tokio::test]
async fn listing_orders_by_day_then_start() {
    let repo = seeded_repo();
    create_slot(
        &repo,
        &TracingNotifier,
        slot_request(1, 1, 1, DayOfWeek::Wednesday, time(7, 0), time(9, 0)),
    )
    .await
    .unwrap();
    create_slot(
        &repo,
        &TracingNotifier,
        slot_request(2, 2, 2, DayOfWeek::Monday, time(13, 0), time(15, 0)),
    )
    .await
    .unwrap();
    create_slot(
        &repo,
        &TracingNotifier,
        slot_request(2, 1, 2, DayOfWeek::Monday, time(7, 0), time(9, 0)),
    )
    .await
    .unwrap();

    let slots = list_slots(&repo, &SlotFilter::default()).await.unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].day, DayOfWeek::Monday);
    assert_eq!(slots[0].start, time(7, 0));
    assert_eq!(slots[1].day, DayOfWeek::Monday);
    assert_eq!(slots[1].start, time(13, 0));
    assert_eq!(slots[2].day, DayOfWeek::Wednesday);
}

#[tokio::test]
async fn history_window_spans_thirty_back_seven_forward() {
    let repo = seeded_with_slots().await;

    let sessions = history_window(&repo, &SlotFilter::default(), ANCHOR())
        .await
        .unwrap();

    let lo = ANCHOR() - Duration::days(30);
    let hi = ANCHOR() + Duration::days(7);
    assert!(!sessions.is_empty());
    for session in &sessions {
        assert!(session.date >= lo && session.date <= hi);
        assert_eq!(DayOfWeek::of_date(session.date), session.slot.day);
    }
    // Newest first.
    assert!(sessions.windows(2).all(|w| w[0].date >= w[1].date));
    // Exactly one session per slot per matching date: 6 Mondays + 5
    // Wednesdays in [2025-05-03, 2025-06-09].
    assert_eq!(sessions.len(), 11);
}

#[tokio::test]
async fn history_window_respects_class_filter() {
    let repo = seeded_with_slots().await;

    let sessions = history_window(
        &repo,
        &SlotFilter::for_class_group(ClassGroupId::new(1)),
        ANCHOR(),
    )
    .await
    .unwrap();

    assert!(!sessions.is_empty());
    assert!(sessions
        .iter()
        .all(|s| s.slot.class_group_id == ClassGroupId::new(1)));
}

#[tokio::test]
async fn upcoming_returns_soonest_first_and_limits() {
    let repo = seeded_with_slots().await;

    // Monday 08:00: the 07:00 class already started, Wednesday is nearest.
    let now = NaiveDateTime::new(ANCHOR(), time(8, 0));
    let sessions = upcoming(&repo, &SlotFilter::default(), now, 5).await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].date, date(2025, 6, 4));
    assert_eq!(sessions[1].date, date(2025, 6, 9));
    for session in &sessions {
        assert!(session.starts_at() >= now);
    }

    let limited = upcoming(&repo, &SlotFilter::default(), now, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].date, date(2025, 6, 4));
}

#[tokio::test]
async fn upcoming_filter_by_lecturer() {
    let repo = seeded_with_slots().await;

    let now = NaiveDateTime::new(ANCHOR(), time(6, 0));
    let sessions = upcoming(
        &repo,
        &SlotFilter::for_lecturer(LecturerId::new(1)),
        now,
        5,
    )
    .await
    .unwrap();

    assert_eq!(sessions.len(), 1);
    // 06:00 is before the 07:00 start, so today still counts.
    assert_eq!(sessions[0].date, ANCHOR());
}

#[tokio::test]
async fn current_week_positions_slots_without_forward_rolling() {
    let repo = seeded_with_slots().await;

    // Friday of the anchor week: both slots map to earlier days.
    let friday = date(2025, 6, 6);
    let sessions = current_week(&repo, &SlotFilter::default(), friday)
        .await
        .unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].date, date(2025, 6, 2));
    assert_eq!(sessions[1].date, date(2025, 6, 4));
}

#[tokio::test]
async fn free_resources_excludes_busy_and_contained_bookings() {
    let repo = seeded_with_slots().await;

    // Window 06:00-10:00 fully contains the Monday 07:00-09:00 booking;
    // the symmetric predicate still marks A101 and L1 busy.
    let free = free_resources(&repo, SEMESTER, DayOfWeek::Monday, time(6, 0), time(10, 0))
        .await
        .unwrap();

    assert!(!free.rooms.iter().any(|r| r.id == RoomId::new(1)));
    assert!(!free.lecturers.iter().any(|l| l.id == LecturerId::new(1)));
    // The untouched room and lecturer stay available.
    assert!(free.rooms.iter().any(|r| r.id == RoomId::new(2)));
    assert!(free.lecturers.iter().any(|l| l.id == LecturerId::new(2)));
}

#[tokio::test]
async fn free_resources_sees_everything_free_on_quiet_days() {
    let repo = seeded_with_slots().await;

    let free = free_resources(&repo, SEMESTER, DayOfWeek::Friday, time(7, 0), time(9, 0))
        .await
        .unwrap();

    assert_eq!(free.rooms.len(), 3);
    assert_eq!(free.lecturers.len(), 2);
}
