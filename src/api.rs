//! Public API surface for the scheduling engine.
//!
//! Identifier newtypes shared across the repository, scheduler, and HTTP
//! layers. All types derive Serialize/Deserialize for JSON serialization.

use serde::{Deserialize, Serialize};

/// Weekly slot identifier (primary key of the template table).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SlotId(pub i64);

/// Room identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub i64);

/// Lecturer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LecturerId(pub i64);

/// Class-group identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassGroupId(pub i64);

/// Subject identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub i64);

macro_rules! impl_id {
    ($($name:ident),+) => {
        $(
            impl $name {
                pub fn new(value: i64) -> Self {
                    $name(value)
                }

                pub fn value(&self) -> i64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

impl_id!(SlotId, RoomId, LecturerId, ClassGroupId, SubjectId);

pub use crate::models::week::DayOfWeek;
pub use crate::models::{
    CatalogSnapshot, ClassGroup, Lecturer, NewSlot, Room, RoomKind, Session, Subject, WeeklySlot,
};
