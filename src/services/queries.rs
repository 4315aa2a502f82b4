//! Read façade combining the slot store with the recurrence projector.
//!
//! These are the entry points the three projection consumers call:
//! attendance history, the personal calendar feed, and "next class" lookups.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{ClassGroupId, LecturerId, SubjectId};
use crate::db::repository::{CatalogRepository, FullRepository, RepositoryResult, SlotRepository};
use crate::models::{DayOfWeek, Lecturer, Room, Session, WeeklySlot};
use crate::scheduler::conflict;
use crate::services::projection::{project, WindowPolicy};

/// Filter applied to the slot table before projection or listing.
/// Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotFilter {
    pub semester: Option<String>,
    pub class_group: Option<ClassGroupId>,
    pub lecturer: Option<LecturerId>,
    pub subject: Option<SubjectId>,
}

impl SlotFilter {
    pub fn for_class_group(class_group: ClassGroupId) -> Self {
        Self {
            class_group: Some(class_group),
            ..Default::default()
        }
    }

    pub fn for_lecturer(lecturer: LecturerId) -> Self {
        Self {
            lecturer: Some(lecturer),
            ..Default::default()
        }
    }

    fn matches(&self, slot: &WeeklySlot) -> bool {
        self.semester
            .as_ref()
            .is_none_or(|semester| &slot.semester == semester)
            && self.class_group.is_none_or(|id| slot.class_group_id == id)
            && self.lecturer.is_none_or(|id| slot.lecturer_id == id)
            && self.subject.is_none_or(|id| slot.subject_id == id)
    }
}

async fn filtered_slots(
    repo: &dyn SlotRepository,
    filter: &SlotFilter,
) -> RepositoryResult<Vec<WeeklySlot>> {
    let slots = repo.snapshot_slots().await?;
    Ok(slots.into_iter().filter(|s| filter.matches(s)).collect())
}

/// List matching slots the way the timetable screen shows them:
/// by day of week, then start time.
pub async fn list_slots(
    repo: &dyn SlotRepository,
    filter: &SlotFilter,
) -> RepositoryResult<Vec<WeeklySlot>> {
    let mut slots = filtered_slots(repo, filter).await?;
    slots.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.start.cmp(&b.start)));
    Ok(slots)
}

/// Dated sessions in the attendance window `[anchor - 30, anchor + 7]`,
/// newest date first.
pub async fn history_window(
    repo: &dyn SlotRepository,
    filter: &SlotFilter,
    anchor: NaiveDate,
) -> RepositoryResult<Vec<Session>> {
    let slots = filtered_slots(repo, filter).await?;
    Ok(project(
        &slots,
        NaiveDateTime::new(anchor, NaiveTime::MIN),
        WindowPolicy::HistoryWindow,
    ))
}

/// The next `limit` upcoming sessions at or after `now`, soonest first.
pub async fn upcoming(
    repo: &dyn SlotRepository,
    filter: &SlotFilter,
    now: NaiveDateTime,
    limit: usize,
) -> RepositoryResult<Vec<Session>> {
    let slots = filtered_slots(repo, filter).await?;
    let mut sessions = project(&slots, now, WindowPolicy::NearestForward);
    sessions.truncate(limit);
    Ok(sessions)
}

/// Every matching slot positioned in the ISO week containing `today`,
/// including days already past.
pub async fn current_week(
    repo: &dyn SlotRepository,
    filter: &SlotFilter,
    today: NaiveDate,
) -> RepositoryResult<Vec<Session>> {
    let slots = filtered_slots(repo, filter).await?;
    Ok(project(
        &slots,
        NaiveDateTime::new(today, NaiveTime::MIN),
        WindowPolicy::CurrentWeek,
    ))
}

/// Rooms and lecturers free in a given semester/day/time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeResources {
    pub rooms: Vec<Room>,
    pub lecturers: Vec<Lecturer>,
}

/// Find rooms and lecturers with no booking overlapping the window.
///
/// Unlike the write gate this uses the symmetric overlap predicate, so a
/// window fully containing an existing booking still marks the resource
/// busy.
pub async fn free_resources(
    repo: &dyn FullRepository,
    semester: &str,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> RepositoryResult<FreeResources> {
    let slots = repo.snapshot_slots().await?;
    let catalog = repo.catalog_snapshot().await?;

    let (busy_rooms, busy_lecturers) =
        conflict::occupied_resources(slots.iter(), semester, day, start, end);

    Ok(FreeResources {
        rooms: catalog
            .rooms
            .into_iter()
            .filter(|room| !busy_rooms.contains(&room.id))
            .collect(),
        lecturers: catalog
            .lecturers
            .into_iter()
            .filter(|lecturer| !busy_lecturers.contains(&lecturer.id))
            .collect(),
    })
}
