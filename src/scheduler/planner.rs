//! Greedy auto-placement of bulk course-offering requests.
//!
//! The planner walks a fixed day/start-time grid in order and commits the
//! first feasible assignment for each request, so request order is placement
//! priority. There is no backtracking and no rollback: slots committed for
//! earlier requests stay committed even when later requests fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ClassGroupId, LecturerId, SubjectId};
use crate::db::repository::{RepositoryError, RepositoryResult, SlotRepository};
use crate::models::{CatalogSnapshot, DayOfWeek, NewSlot, RoomKind, WeeklySlot};
use crate::scheduler::conflict;

/// Minutes per teaching period.
pub const PERIOD_MINUTES: i64 = 50;

/// Candidate start times tried for every teaching day, in order.
pub fn candidate_starts() -> [NaiveTime; 4] {
    [hm(7, 0), hm(9, 0), hm(13, 0), hm(15, 0)]
}

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or(NaiveTime::MIN)
}

/// One bulk-imported course offering to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub class_group_id: ClassGroupId,
    pub subject_id: SubjectId,
    pub lecturer_id: LecturerId,
    /// Free-text room-type hint; see [`RoomKind::from_hint`].
    pub room_kind_hint: String,
    /// Number of 50-minute periods the offering needs.
    pub period_count: u32,
}

/// A request the planner could not place, with the exhausted-search reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRequest {
    pub request: PlacementRequest,
    pub reason: String,
}

/// Outcome of a batch placement. Partial success is expected and reported,
/// not fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub placed: Vec<WeeklySlot>,
    pub failed: Vec<FailedRequest>,
}

impl PlanResult {
    pub fn summary(&self) -> String {
        format!(
            "{} placed, {} failed",
            self.placed.len(),
            self.failed.len()
        )
    }
}

/// Cooperative cancellation handle polled between planner iterations.
///
/// Cancelling abandons further placement work; slots already committed for
/// earlier requests remain committed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Place a batch of requests into free slots of `semester`.
///
/// Greedy first-fit: days outer (Monday..Saturday), start times inner
/// (07:00, 09:00, 13:00, 15:00). A (day, start) is feasible when neither
/// the class-group nor the lecturer is busy there; the first room matching
/// the kind hint with sufficient capacity and no booking in that window is
/// taken and committed immediately, so the new slot is visible to the
/// conflict checks of every later request in the same batch.
///
/// The catalog is an immutable snapshot captured by the caller at batch
/// start; only the slot table is re-read between probes.
pub async fn place_batch(
    repo: &dyn SlotRepository,
    catalog: &CatalogSnapshot,
    requests: Vec<PlacementRequest>,
    semester: &str,
    cancel: &CancelToken,
) -> RepositoryResult<PlanResult> {
    let mut result = PlanResult::default();

    info!(
        semester,
        requests = requests.len(),
        "starting batch placement"
    );

    for request in requests {
        if cancel.is_cancelled() {
            warn!(semester, "batch placement cancelled, abandoning remaining requests");
            result.failed.push(FailedRequest {
                reason: "batch cancelled before this request was attempted".to_string(),
                request,
            });
            continue;
        }

        match place_one(repo, catalog, &request, semester, cancel).await? {
            Ok(slot) => {
                info!(
                    slot_id = slot.id.value(),
                    class_group = request.class_group_id.value(),
                    subject = request.subject_id.value(),
                    day = %slot.day,
                    start = %slot.start,
                    "placed request"
                );
                result.placed.push(slot);
            }
            Err(reason) => {
                warn!(
                    class_group = request.class_group_id.value(),
                    subject = request.subject_id.value(),
                    reason = %reason,
                    "request not placed"
                );
                result.failed.push(FailedRequest { request, reason });
            }
        }
    }

    info!(semester, summary = %result.summary(), "batch placement finished");
    Ok(result)
}

/// Try every (day, start, room) combination for one request.
/// `Ok(Err(reason))` is a per-request failure; `Err(_)` is a storage fault.
async fn place_one(
    repo: &dyn SlotRepository,
    catalog: &CatalogSnapshot,
    request: &PlacementRequest,
    semester: &str,
    cancel: &CancelToken,
) -> RepositoryResult<Result<WeeklySlot, String>> {
    let Some(class_group) = catalog.class_group(request.class_group_id) else {
        return Ok(Err(format!(
            "class-group {} is not in the catalog",
            request.class_group_id
        )));
    };
    if catalog.lecturer(request.lecturer_id).is_none() {
        return Ok(Err(format!(
            "lecturer {} is not in the catalog",
            request.lecturer_id
        )));
    }
    if catalog.subject(request.subject_id).is_none() {
        return Ok(Err(format!(
            "subject {} is not in the catalog",
            request.subject_id
        )));
    }
    if request.period_count == 0 {
        return Ok(Err("period count must be at least 1".to_string()));
    }

    let wanted_kind = RoomKind::from_hint(&request.room_kind_hint);
    let length = Duration::minutes(PERIOD_MINUTES * i64::from(request.period_count));

    for day in DayOfWeek::TEACHING_DAYS {
        for start in candidate_starts() {
            if cancel.is_cancelled() {
                return Ok(Err(
                    "batch cancelled while searching for a free slot".to_string()
                ));
            }

            let (end, wrapped) = start.overflowing_add_signed(length);
            if wrapped != 0 {
                // Too many periods to fit before midnight from this start.
                continue;
            }

            let slots = repo.snapshot_slots().await?;

            if conflict::class_or_lecturer_busy(
                slots.iter(),
                semester,
                day,
                start,
                end,
                request.class_group_id,
                request.lecturer_id,
            ) {
                continue;
            }

            let booked = conflict::booked_room_ids(slots.iter(), semester, day, start, end);
            let Some(room) = catalog.rooms.iter().find(|room| {
                !booked.contains(&room.id)
                    && room.kind == wanted_kind
                    && room.capacity >= class_group.max_headcount
            }) else {
                continue;
            };

            let candidate = NewSlot {
                class_group_id: request.class_group_id,
                subject_id: request.subject_id,
                room_id: room.id,
                lecturer_id: request.lecturer_id,
                day,
                start,
                end,
                semester: semester.to_string(),
            };

            match repo.insert_slot(candidate).await {
                Ok(slot) => return Ok(Ok(slot)),
                Err(RepositoryError::Conflict { conflict, .. }) => {
                    // Lost a race against a concurrent writer; keep searching.
                    debug!(%conflict, "placement commit lost a race, resuming search");
                    continue;
                }
                Err(other) => return Err(other),
            }
        }
    }

    Ok(Err(format!(
        "no free day/time/room combination in {} for a {:?} room seating {}",
        semester, wanted_kind, class_group.max_headcount
    )))
}
