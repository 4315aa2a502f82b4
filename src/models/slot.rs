//! Weekly timetable templates and their derived dated sessions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{ClassGroupId, LecturerId, RoomId, SlotId, SubjectId};
use crate::models::week::DayOfWeek;

/// A recurring weekly timetable entry.
///
/// The template is the persistent source of truth; concrete dated
/// occurrences are always derived from it on demand (see [`Session`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub id: SlotId,
    pub class_group_id: ClassGroupId,
    pub subject_id: SubjectId,
    pub room_id: RoomId,
    pub lecturer_id: LecturerId,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Opaque partition label. Slots in different semesters never conflict.
    pub semester: String,
}

impl WeeklySlot {
    pub fn from_new(id: SlotId, slot: NewSlot) -> Self {
        Self {
            id,
            class_group_id: slot.class_group_id,
            subject_id: slot.subject_id,
            room_id: slot.room_id,
            lecturer_id: slot.lecturer_id,
            day: slot.day,
            start: slot.start,
            end: slot.end,
            semester: slot.semester,
        }
    }

    /// The candidate shape of this slot, used when re-checking conflicts on edit.
    pub fn as_new(&self) -> NewSlot {
        NewSlot {
            class_group_id: self.class_group_id,
            subject_id: self.subject_id,
            room_id: self.room_id,
            lecturer_id: self.lecturer_id,
            day: self.day,
            start: self.start,
            end: self.end,
            semester: self.semester.clone(),
        }
    }
}

/// An unkeyed slot candidate, as submitted to a create or edit operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSlot {
    pub class_group_id: ClassGroupId,
    pub subject_id: SubjectId,
    pub room_id: RoomId,
    pub lecturer_id: LecturerId,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub semester: String,
}

impl NewSlot {
    /// Structural validation, run before any conflict check.
    pub fn validate(&self) -> Result<(), String> {
        if self.end <= self.start {
            return Err("end time must be after start time".to_string());
        }
        if self.semester.trim().is_empty() {
            return Err("semester label must not be empty".to_string());
        }
        Ok(())
    }
}

/// One concrete calendar-dated occurrence of a [`WeeklySlot`].
///
/// Sessions are derived values and are never stored; every consumer
/// recomputes them from the slot table and a window policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub slot: WeeklySlot,
    pub date: NaiveDate,
}

impl Session {
    pub fn new(slot: WeeklySlot, date: NaiveDate) -> Self {
        Self { slot, date }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.slot.start)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.slot.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClassGroupId, LecturerId, RoomId, SubjectId};

    fn candidate(start: (u32, u32), end: (u32, u32)) -> NewSlot {
        NewSlot {
            class_group_id: ClassGroupId::new(1),
            subject_id: SubjectId::new(1),
            room_id: RoomId::new(1),
            lecturer_id: LecturerId::new(1),
            day: DayOfWeek::Monday,
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            semester: "HK1-2025".to_string(),
        }
    }

    #[test]
    fn valid_range_passes() {
        assert!(candidate((7, 0), (9, 0)).validate().is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(candidate((9, 0), (7, 0)).validate().is_err());
    }

    #[test]
    fn zero_length_range_is_rejected() {
        assert!(candidate((7, 0), (7, 0)).validate().is_err());
    }

    #[test]
    fn blank_semester_is_rejected() {
        let mut slot = candidate((7, 0), (9, 0));
        slot.semester = "  ".to_string();
        assert!(slot.validate().is_err());
    }

    #[test]
    fn session_datetimes_combine_date_and_slot_times() {
        let slot = WeeklySlot::from_new(crate::api::SlotId::new(1), candidate((7, 0), (9, 0)));
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let session = Session::new(slot, date);
        assert_eq!(
            session.starts_at(),
            NaiveDateTime::new(date, NaiveTime::from_hms_opt(7, 0, 0).unwrap())
        );
        assert_eq!(
            session.ends_at(),
            NaiveDateTime::new(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
    }
}
