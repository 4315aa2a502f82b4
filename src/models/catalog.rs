//! Resource catalog: rooms, lecturers, class-groups, subjects.
//!
//! Reference entities owned by administrative screens outside this engine.
//! The engine only reads them, always through an immutable [`CatalogSnapshot`]
//! captured up front, so placement decisions never observe a half-updated
//! catalog.

use serde::{Deserialize, Serialize};

use crate::api::{ClassGroupId, LecturerId, RoomId, SubjectId};

/// Kind of teaching room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Theory,
    Practice,
    Hall,
}

impl RoomKind {
    /// Map a free-text room-type hint (as found in bulk-import rows) to a
    /// kind. A case-insensitive "practice" substring selects [`Practice`];
    /// anything else falls back to [`Theory`].
    ///
    /// [`Practice`]: RoomKind::Practice
    /// [`Theory`]: RoomKind::Theory
    pub fn from_hint(hint: &str) -> Self {
        if hint.to_lowercase().contains("practice") {
            RoomKind::Practice
        } else {
            RoomKind::Theory
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub kind: RoomKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: LecturerId,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub id: ClassGroupId,
    pub name: String,
    /// Cohort label, e.g. "2024-2028".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    /// Maximum headcount, checked against room capacity during placement.
    pub max_headcount: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

/// Immutable copy of the whole catalog.
///
/// The auto-placement planner receives one of these at batch start instead of
/// reading shared storage inside its search loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub rooms: Vec<Room>,
    pub lecturers: Vec<Lecturer>,
    pub class_groups: Vec<ClassGroup>,
    pub subjects: Vec<Subject>,
}

impl CatalogSnapshot {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn lecturer(&self, id: LecturerId) -> Option<&Lecturer> {
        self.lecturers.iter().find(|l| l.id == id)
    }

    pub fn class_group(&self, id: ClassGroupId) -> Option<&ClassGroup> {
        self.class_groups.iter().find(|c| c.id == id)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }
}
