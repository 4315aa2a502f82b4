//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Weekdays cross this boundary by enumeration name and times as ISO
//! `HH:MM:SS` strings; a bare numeric weekday code is never accepted.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{ClassGroupId, DayOfWeek, LecturerId, RoomId, SubjectId};
use crate::models::{NewSlot, Session, WeeklySlot};
use crate::scheduler::planner::PlacementRequest;
use crate::services::queries::SlotFilter;

// Re-export existing DTOs that are already serializable
pub use crate::services::job_tracker::LogEntry;
pub use crate::services::queries::FreeResources;

/// Request body for creating or editing a weekly slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    pub class_group_id: i64,
    pub subject_id: i64,
    pub room_id: i64,
    pub lecturer_id: i64,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub semester: String,
}

impl From<SlotRequest> for NewSlot {
    fn from(req: SlotRequest) -> Self {
        NewSlot {
            class_group_id: ClassGroupId::new(req.class_group_id),
            subject_id: SubjectId::new(req.subject_id),
            room_id: RoomId::new(req.room_id),
            lecturer_id: LecturerId::new(req.lecturer_id),
            day: req.day,
            start: req.start,
            end: req.end,
            semester: req.semester,
        }
    }
}

/// Response for slot creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotResponse {
    /// Id assigned to the committed slot
    pub id: i64,
}

/// Slot list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotListResponse {
    pub slots: Vec<WeeklySlot>,
    pub total: usize,
}

/// One projected session in an API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    pub date: NaiveDate,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub slot: WeeklySlot,
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            date: session.date,
            starts_at: session.starts_at(),
            ends_at: session.ends_at(),
            slot: session.slot,
        }
    }
}

/// Session list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionDto>,
    pub total: usize,
}

impl SessionListResponse {
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        let sessions: Vec<SessionDto> = sessions.into_iter().map(Into::into).collect();
        let total = sessions.len();
        Self { sessions, total }
    }
}

/// Slot filter fields shared by the listing and projection endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterQuery {
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub class_group_id: Option<i64>,
    #[serde(default)]
    pub lecturer_id: Option<i64>,
    #[serde(default)]
    pub subject_id: Option<i64>,
}

impl From<FilterQuery> for SlotFilter {
    fn from(query: FilterQuery) -> Self {
        SlotFilter {
            semester: query.semester,
            class_group: query.class_group_id.map(ClassGroupId::new),
            lecturer: query.lecturer_id.map(LecturerId::new),
            subject: query.subject_id.map(SubjectId::new),
        }
    }
}

/// Query parameters for the history-window endpoint.
///
/// The filter fields are repeated inline rather than flattened: flattened
/// structs do not survive urlencoded query deserialization for numeric
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryQuery {
    /// Anchor date; defaults to today
    #[serde(default)]
    pub anchor: Option<NaiveDate>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub class_group_id: Option<i64>,
    #[serde(default)]
    pub lecturer_id: Option<i64>,
    #[serde(default)]
    pub subject_id: Option<i64>,
}

impl HistoryQuery {
    pub fn filter(&self) -> SlotFilter {
        FilterQuery {
            semester: self.semester.clone(),
            class_group_id: self.class_group_id,
            lecturer_id: self.lecturer_id,
            subject_id: self.subject_id,
        }
        .into()
    }
}

/// Query parameters for the upcoming-sessions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpcomingQuery {
    /// Maximum number of sessions to return (default: 5)
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub class_group_id: Option<i64>,
    #[serde(default)]
    pub lecturer_id: Option<i64>,
    #[serde(default)]
    pub subject_id: Option<i64>,
}

impl UpcomingQuery {
    pub fn filter(&self) -> SlotFilter {
        FilterQuery {
            semester: self.semester.clone(),
            class_group_id: self.class_group_id,
            lecturer_id: self.lecturer_id,
            subject_id: self.subject_id,
        }
        .into()
    }
}

/// Query parameters for the free-resources endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeResourcesQuery {
    pub semester: String,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// One row of a bulk placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRequestDto {
    pub class_group_id: i64,
    pub subject_id: i64,
    pub lecturer_id: i64,
    /// Free-text room-type hint ("practice" selects practice rooms)
    #[serde(default)]
    pub room_kind_hint: String,
    pub period_count: u32,
}

impl From<PlacementRequestDto> for PlacementRequest {
    fn from(dto: PlacementRequestDto) -> Self {
        PlacementRequest {
            class_group_id: ClassGroupId::new(dto.class_group_id),
            subject_id: SubjectId::new(dto.subject_id),
            lecturer_id: LecturerId::new(dto.lecturer_id),
            room_kind_hint: dto.room_kind_hint,
            period_count: dto.period_count,
        }
    }
}

/// Request body for bulk placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBatchRequest {
    pub semester: String,
    pub requests: Vec<PlacementRequestDto>,
}

/// Response for bulk placement submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBatchResponse {
    /// Job ID for tracking the async placement
    pub job_id: String,
    /// Message about the operation
    pub message: String,
}

/// Job status response for async placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID
    pub job_id: String,
    /// Job status
    pub status: String,
    /// Log entries
    pub logs: Vec<LogEntry>,
    /// Result if completed: placed/failed counts plus the committed slots
    pub result: Option<serde_json::Value>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage backend status
    pub database: String,
}
