//! Resource-conflict detection over the weekly slot table.
//!
//! Pure functions: callers hand in a snapshot of committed slots, so the
//! same predicates serve the repository's gated write path, the planner's
//! feasibility probes, and tests, without touching storage.

use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::api::{ClassGroupId, LecturerId, RoomId, SlotId};
use crate::models::{DayOfWeek, NewSlot, WeeklySlot};

/// Which resource axis a candidate collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAxis {
    Room,
    Lecturer,
}

impl ConflictAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictAxis::Room => "room",
            ConflictAxis::Lecturer => "lecturer",
        }
    }
}

/// A detected collision with an already-committed slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub axis: ConflictAxis,
    /// The committed slot that blocks the candidate.
    pub existing: SlotId,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} busy: slot {} occupies {} {}-{}",
            self.axis.as_str(),
            self.existing,
            self.day,
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
        )
    }
}

/// Legacy boundary test used by the write gate: the candidate's start
/// falling inside `[start, end)` of an existing slot, or its end falling
/// inside `(start, end]`.
///
/// A candidate that strictly contains an existing slot is NOT flagged by
/// this test. Correcting that would change which timetables the gate
/// accepts, so it stays as-is; [`overlaps`] is the symmetric predicate.
pub fn overlaps_boundary(
    candidate_start: NaiveTime,
    candidate_end: NaiveTime,
    existing_start: NaiveTime,
    existing_end: NaiveTime,
) -> bool {
    (candidate_start >= existing_start && candidate_start < existing_end)
        || (candidate_end > existing_start && candidate_end <= existing_end)
}

/// Symmetric half-open interval overlap, including full containment.
/// Backs the free-resource suggestion query.
pub fn overlaps(
    candidate_start: NaiveTime,
    candidate_end: NaiveTime,
    existing_start: NaiveTime,
    existing_end: NaiveTime,
) -> bool {
    candidate_start < existing_end && candidate_end > existing_start
}

fn same_partition(slot: &WeeklySlot, semester: &str, day: DayOfWeek) -> bool {
    slot.semester == semester && slot.day == day
}

/// Check a candidate slot against every committed slot in the same
/// semester-and-day partition, excluding `exclude` when editing.
///
/// The room axis is tested before the lecturer axis, so a candidate that
/// collides on both reports the room conflict.
pub fn conflict_for<'a, I>(candidate: &NewSlot, slots: I, exclude: Option<SlotId>) -> Option<Conflict>
where
    I: IntoIterator<Item = &'a WeeklySlot> + Clone,
{
    let blocking = |axis: ConflictAxis, hit: &WeeklySlot| Conflict {
        axis,
        existing: hit.id,
        day: hit.day,
        start: hit.start,
        end: hit.end,
    };

    let considered = |slot: &&WeeklySlot| {
        Some(slot.id) != exclude && same_partition(slot, &candidate.semester, candidate.day)
    };

    if let Some(hit) = slots.clone().into_iter().filter(considered).find(|slot| {
        slot.room_id == candidate.room_id
            && overlaps_boundary(candidate.start, candidate.end, slot.start, slot.end)
    }) {
        return Some(blocking(ConflictAxis::Room, hit));
    }

    if let Some(hit) = slots.into_iter().filter(considered).find(|slot| {
        slot.lecturer_id == candidate.lecturer_id
            && overlaps_boundary(candidate.start, candidate.end, slot.start, slot.end)
    }) {
        return Some(blocking(ConflictAxis::Lecturer, hit));
    }

    None
}

/// Whether the class-group or the lecturer already teaches somewhere in the
/// given semester/day/time window. Used by the planner's feasibility probe.
pub fn class_or_lecturer_busy<'a, I>(
    slots: I,
    semester: &str,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
    class_group: ClassGroupId,
    lecturer: LecturerId,
) -> bool
where
    I: IntoIterator<Item = &'a WeeklySlot>,
{
    slots.into_iter().any(|slot| {
        same_partition(slot, semester, day)
            && (slot.class_group_id == class_group || slot.lecturer_id == lecturer)
            && overlaps_boundary(start, end, slot.start, slot.end)
    })
}

/// Rooms already booked in the given semester/day/time window.
pub fn booked_room_ids<'a, I>(
    slots: I,
    semester: &str,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> HashSet<RoomId>
where
    I: IntoIterator<Item = &'a WeeklySlot>,
{
    slots
        .into_iter()
        .filter(|slot| {
            same_partition(slot, semester, day)
                && overlaps_boundary(start, end, slot.start, slot.end)
        })
        .map(|slot| slot.room_id)
        .collect()
}

/// Rooms and lecturers occupied in the window under the symmetric overlap
/// predicate (full containment included). Feeds the free-resource query.
pub fn occupied_resources<'a, I>(
    slots: I,
    semester: &str,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> (HashSet<RoomId>, HashSet<LecturerId>)
where
    I: IntoIterator<Item = &'a WeeklySlot>,
{
    let mut rooms = HashSet::new();
    let mut lecturers = HashSet::new();
    for slot in slots {
        if same_partition(slot, semester, day) && overlaps(start, end, slot.start, slot.end) {
            rooms.insert(slot.room_id);
            lecturers.insert(slot.lecturer_id);
        }
    }
    (rooms, lecturers)
}
