//! Async batch placement service.
//!
//! Runs a bulk placement batch in the background, emitting progress logs to
//! the job tracker so callers can follow along via SSE and cancel midway.

use std::sync::Arc;

use crate::db::repository::{CatalogRepository, FullRepository};
use crate::scheduler::planner::{self, PlacementRequest, PlanResult};
use crate::services::job_tracker::{JobTracker, LogLevel};

/// Place a batch asynchronously, logging per-request outcomes.
///
/// Designed to be spawned as a background task. The job's cancellation token
/// is polled by the planner between iterations; already-committed slots stay
/// committed when the batch is cancelled.
pub async fn process_batch_async(
    job_id: String,
    tracker: JobTracker,
    repo: Arc<dyn FullRepository>,
    requests: Vec<PlacementRequest>,
    semester: String,
) -> Result<PlanResult, String> {
    tracker.log(
        &job_id,
        LogLevel::Info,
        format!("Placing {} requests into {}...", requests.len(), semester),
    );

    let catalog = match repo.catalog_snapshot().await {
        Ok(catalog) => catalog,
        Err(e) => {
            let msg = format!("Failed to snapshot catalog: {}", e);
            tracker.fail_job(&job_id, &msg);
            return Err(msg);
        }
    };
    tracker.log(
        &job_id,
        LogLevel::Info,
        format!(
            "Catalog snapshot: {} rooms, {} lecturers",
            catalog.rooms.len(),
            catalog.lecturers.len()
        ),
    );

    let cancel = tracker.cancel_token(&job_id).unwrap_or_default();
    let result =
        match planner::place_batch(repo.as_ref(), &catalog, requests, &semester, &cancel).await {
            Ok(result) => result,
            Err(e) => {
                let msg = format!("Batch placement aborted: {}", e);
                tracker.fail_job(&job_id, &msg);
                return Err(msg);
            }
        };

    for slot in &result.placed {
        tracker.log(
            &job_id,
            LogLevel::Success,
            format!(
                "Placed class {} / subject {} on {} {} (slot {})",
                slot.class_group_id,
                slot.subject_id,
                slot.day,
                slot.start.format("%H:%M"),
                slot.id
            ),
        );
    }
    for failure in &result.failed {
        tracker.log(
            &job_id,
            LogLevel::Warning,
            format!(
                "Could not place class {} / subject {}: {}",
                failure.request.class_group_id, failure.request.subject_id, failure.reason
            ),
        );
    }

    let summary = serde_json::json!({
        "placed": result.placed.len(),
        "failed": result.failed.len(),
        "slots": result.placed,
        "failures": result.failed,
    });

    if cancel.is_cancelled() {
        tracker.log(&job_id, LogLevel::Warning, "Batch cancelled by caller");
        tracker.mark_cancelled(&job_id, Some(summary));
    } else {
        tracker.log(
            &job_id,
            LogLevel::Success,
            format!("Batch finished: {}", result.summary()),
        );
        tracker.complete_job(&job_id, Some(summary));
    }

    Ok(result)
}
