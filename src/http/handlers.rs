//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    CreateSlotResponse, FilterQuery, FreeResources, FreeResourcesQuery, HealthResponse,
    HistoryQuery, JobStatusResponse, PlaceBatchRequest, PlaceBatchResponse, SessionListResponse,
    SlotListResponse, SlotRequest, UpcomingQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::SlotId;
use crate::db::repository::SlotRepository;
use crate::db::services as db_services;
use crate::models::WeeklySlot;
use crate::scheduler::planner::PlacementRequest;
use crate::services::job_tracker::JobStatus;
use crate::services::queries;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is
/// accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Slot CRUD
// =============================================================================

/// GET /v1/slots
///
/// List weekly slots, optionally filtered, ordered by day then start time.
pub async fn list_slots(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<SlotListResponse> {
    let slots = queries::list_slots(state.repository.as_ref(), &query.into()).await?;
    let total = slots.len();

    Ok(Json(SlotListResponse { slots, total }))
}

/// GET /v1/slots/{id}
pub async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<WeeklySlot> {
    let slot = state.repository.get_slot(SlotId::new(id)).await?;
    Ok(Json(slot))
}

/// POST /v1/slots
///
/// Create a weekly slot. Returns 409 with the busy axis when the candidate
/// collides with a committed slot.
pub async fn create_slot(
    State(state): State<AppState>,
    Json(request): Json<SlotRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateSlotResponse>), AppError> {
    let stored = db_services::create_slot(
        state.repository.as_ref(),
        state.notifier.as_ref(),
        request.into(),
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateSlotResponse {
            id: stored.id.value(),
        }),
    ))
}

/// PUT /v1/slots/{id}
///
/// Edit a weekly slot in place. The edited slot is excluded from its own
/// conflict check.
pub async fn edit_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SlotRequest>,
) -> HandlerResult<WeeklySlot> {
    let stored = db_services::edit_slot(
        state.repository.as_ref(),
        state.notifier.as_ref(),
        SlotId::new(id),
        request.into(),
    )
    .await?;

    Ok(Json(stored))
}

/// DELETE /v1/slots/{id}
pub async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    db_services::delete_slot(
        state.repository.as_ref(),
        state.notifier.as_ref(),
        SlotId::new(id),
    )
    .await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

// =============================================================================
// Projection Endpoints
// =============================================================================

/// GET /v1/sessions/history
///
/// Dated sessions in the attendance window `[anchor - 30, anchor + 7]`,
/// newest date first.
pub async fn history_window(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> HandlerResult<SessionListResponse> {
    let anchor = query.anchor.unwrap_or_else(|| now().date());
    let sessions =
        queries::history_window(state.repository.as_ref(), &query.filter(), anchor).await?;

    Ok(Json(SessionListResponse::from_sessions(sessions)))
}

/// GET /v1/sessions/upcoming
///
/// The next N sessions at or after now, soonest first.
pub async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> HandlerResult<SessionListResponse> {
    let limit = query.limit.unwrap_or(5);
    let sessions =
        queries::upcoming(state.repository.as_ref(), &query.filter(), now(), limit).await?;

    Ok(Json(SessionListResponse::from_sessions(sessions)))
}

/// GET /v1/sessions/current-week
///
/// Every matching slot positioned in the current ISO week, including days
/// already past.
pub async fn current_week(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<SessionListResponse> {
    let sessions =
        queries::current_week(state.repository.as_ref(), &query.into(), now().date()).await?;

    Ok(Json(SessionListResponse::from_sessions(sessions)))
}

/// GET /v1/resources/free
///
/// Rooms and lecturers free in a semester/day/time window.
pub async fn free_resources(
    State(state): State<AppState>,
    Query(query): Query<FreeResourcesQuery>,
) -> HandlerResult<FreeResources> {
    if query.end <= query.start {
        return Err(AppError::BadRequest(
            "end time must be after start time".to_string(),
        ));
    }

    let free = queries::free_resources(
        state.repository.as_ref(),
        &query.semester,
        query.day,
        query.start,
        query.end,
    )
    .await?;

    Ok(Json(free))
}

// =============================================================================
// Async Batch Placement
// =============================================================================

/// POST /v1/slots/place-batch
///
/// Place a batch of course offerings asynchronously. Returns a job ID for
/// tracking progress.
pub async fn place_batch(
    State(state): State<AppState>,
    Json(request): Json<PlaceBatchRequest>,
) -> Result<(axum::http::StatusCode, Json<PlaceBatchResponse>), AppError> {
    if request.requests.is_empty() {
        return Err(AppError::BadRequest(
            "batch must contain at least one request".to_string(),
        ));
    }

    let job_id = state.job_tracker.create_job();
    let response_job_id = job_id.clone();

    let tracker = state.job_tracker.clone();
    let repo = state.repository.clone();
    let semester = request.semester.clone();
    let requests: Vec<PlacementRequest> =
        request.requests.into_iter().map(Into::into).collect();

    tokio::spawn(async move {
        let _ = crate::services::batch_processor::process_batch_async(
            job_id, tracker, repo, requests, semester,
        )
        .await;
    });

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(PlaceBatchResponse {
            job_id: response_job_id.clone(),
            message: format!(
                "Batch placement started. Track progress at /v1/jobs/{}/logs",
                response_job_id
            ),
        }),
    ))
}

/// GET /v1/jobs/{job_id}
///
/// Get the current status and logs of a background job.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobStatusResponse> {
    let job = state
        .job_tracker
        .get_job(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(JobStatusResponse {
        job_id: job.job_id,
        status: format!("{:?}", job.status).to_lowercase(),
        logs: job.logs,
        result: job.result,
    }))
}

/// POST /v1/jobs/{job_id}/cancel
///
/// Request cancellation of a running batch job. Slots already committed
/// stay committed.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    if state.job_tracker.request_cancel(&job_id) {
        Ok(axum::http::StatusCode::ACCEPTED)
    } else {
        Err(AppError::BadRequest(format!(
            "Job {} has already finished",
            job_id
        )))
    }
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream job logs via Server-Sent Events (SSE).
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Verify job exists
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let tracker = state.job_tracker.clone();
    let stream = async_stream::stream! {
        let mut last_log_count = 0;
        loop {
            // Get current logs
            let logs = tracker.get_logs(&job_id);

            // Send new logs since last check
            for log in logs.iter().skip(last_log_count) {
                let event_data = serde_json::to_string(log).unwrap_or_default();
                yield Ok(Event::default().data(event_data));
            }
            last_log_count = logs.len();

            // Check if job is complete
            if let Some(job) = tracker.get_job(&job_id) {
                if job.status != JobStatus::Running {
                    // Send final status event. Serde serialization keeps
                    // status values lowercase ("completed", "cancelled").
                    let final_event = serde_json::json!({
                        "status": job.status,
                        "result": job.result,
                    });
                    yield Ok(Event::default()
                        .event("complete")
                        .data(serde_json::to_string(&final_event).unwrap_or_default()));
                    break;
                }
            } else {
                break;
            }

            // Wait before checking again
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
