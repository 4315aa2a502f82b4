//! Shared fixtures for integration tests.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use chrono::NaiveTime;

use timetable_rust::api::{ClassGroupId, LecturerId, RoomId, SubjectId};
use timetable_rust::db::repositories::LocalRepository;
use timetable_rust::models::{
    CatalogSnapshot, ClassGroup, DayOfWeek, Lecturer, NewSlot, Room, RoomKind, Subject,
};

pub const SEMESTER: &str = "HK1-2025";

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Catalog mirroring the reference scenario: rooms A101/A102 (Theory, 40/60
/// seats), a practice lab, lecturers L1/L2, classes C1/C2, subject Math.
pub fn catalog() -> CatalogSnapshot {
    CatalogSnapshot {
        rooms: vec![
            Room {
                id: RoomId::new(1),
                name: "A101".to_string(),
                capacity: 40,
                kind: RoomKind::Theory,
            },
            Room {
                id: RoomId::new(2),
                name: "A102".to_string(),
                capacity: 60,
                kind: RoomKind::Theory,
            },
            Room {
                id: RoomId::new(3),
                name: "LAB-1".to_string(),
                capacity: 30,
                kind: RoomKind::Practice,
            },
        ],
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
        class_groups: vec![
            ClassGroup {
                id: ClassGroupId::new(1),
                name: "C1".to_string(),
                academic_year: Some("2024-2028".to_string()),
                max_headcount: 40,
            },
            ClassGroup {
                id: ClassGroupId::new(2),
                name: "C2".to_string(),
                academic_year: Some("2024-2028".to_string()),
                max_headcount: 25,
            },
        ],
        subjects: vec![Subject {
            id: SubjectId::new(1),
            name: "Math".to_string(),
        }],
    }
}

/// A catalog with exactly one Theory room seating 40, for the contended
/// placement scenario.
pub fn single_room_catalog() -> CatalogSnapshot {
    let mut catalog = catalog();
    catalog.rooms.retain(|room| room.id == RoomId::new(1));
    catalog
}

pub fn seeded_repo() -> LocalRepository {
    LocalRepository::with_catalog(catalog())
}

pub fn slot_request(
    class: i64,
    room: i64,
    lecturer: i64,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> NewSlot {
    NewSlot {
        class_group_id: ClassGroupId::new(class),
        subject_id: SubjectId::new(1),
        room_id: RoomId::new(room),
        lecturer_id: LecturerId::new(lecturer),
        day,
        start,
        end,
        semester: SEMESTER.to_string(),
    }
}
