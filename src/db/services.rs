//! High-level write operations over the slot repository.
//!
//! Every single-slot mutation goes through here: structural validation
//! first, then the repository's gated write, then exactly one change
//! notification. Transient storage failures are retried a bounded number
//! of times before surfacing.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::SlotId;
use crate::db::repository::{
    CatalogRepository, FullRepository, RepositoryError, RepositoryResult, SlotRepository,
};
use crate::models::{CatalogSnapshot, NewSlot, WeeklySlot};
use crate::scheduler::conflict::Conflict;
use crate::services::notifier::{ChangeKind, ChangeNotifier, ScheduleChange};

/// Bounded retry for transient storage failures.
const MAX_WRITE_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(50);

/// Error type for schedule write operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Rejected before any conflict check ran.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The candidate collides with a committed slot; the payload names the
    /// axis (room or lecturer) and the blocking slot.
    #[error("{0}")]
    Conflict(Conflict),

    /// The slot id does not exist at edit/delete time.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage failure that survived the bounded retry.
    #[error("storage failure: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ScheduleError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { conflict, .. } => ScheduleError::Conflict(conflict),
            RepositoryError::NotFound { message, .. } => ScheduleError::NotFound(message),
            RepositoryError::ValidationError { message, .. } => ScheduleError::Validation(message),
            other => ScheduleError::Storage(other),
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Create a weekly slot.
///
/// Validation runs before the conflict check; the conflict check and the
/// insert are atomic inside the repository. The notifier is invoked exactly
/// once, only after the slot is committed.
pub async fn create_slot(
    repo: &dyn FullRepository,
    notifier: &dyn ChangeNotifier,
    slot: NewSlot,
) -> ScheduleResult<WeeklySlot> {
    slot.validate().map_err(ScheduleError::Validation)?;
    let catalog = repo.catalog_snapshot().await?;
    check_references(&slot, &catalog)?;

    let stored = with_retry("create_slot", || repo.insert_slot(slot.clone())).await?;
    info!(slot_id = stored.id.value(), semester = %stored.semester, "slot created");

    notifier
        .slot_changed(ScheduleChange::describe(
            ChangeKind::Created,
            &stored,
            &catalog,
        ))
        .await;
    Ok(stored)
}

/// Edit a weekly slot in place. The slot being edited is excluded from its
/// own conflict check.
pub async fn edit_slot(
    repo: &dyn FullRepository,
    notifier: &dyn ChangeNotifier,
    id: SlotId,
    slot: NewSlot,
) -> ScheduleResult<WeeklySlot> {
    slot.validate().map_err(ScheduleError::Validation)?;
    let catalog = repo.catalog_snapshot().await?;
    check_references(&slot, &catalog)?;

    let stored = with_retry("edit_slot", || repo.update_slot(id, slot.clone())).await?;
    info!(slot_id = id.value(), "slot updated");

    notifier
        .slot_changed(ScheduleChange::describe(
            ChangeKind::Updated,
            &stored,
            &catalog,
        ))
        .await;
    Ok(stored)
}

/// Delete a weekly slot. The change description is built from the removed
/// slot; already-projected sessions are unaffected because sessions are
/// never stored.
pub async fn delete_slot(
    repo: &dyn FullRepository,
    notifier: &dyn ChangeNotifier,
    id: SlotId,
) -> ScheduleResult<WeeklySlot> {
    let catalog = repo.catalog_snapshot().await?;
    let removed = with_retry("delete_slot", || repo.delete_slot(id)).await?;
    info!(slot_id = id.value(), "slot deleted");

    notifier
        .slot_changed(ScheduleChange::describe(
            ChangeKind::Deleted,
            &removed,
            &catalog,
        ))
        .await;
    Ok(removed)
}

/// Liveness probe used by the health endpoint.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

fn check_references(slot: &NewSlot, catalog: &CatalogSnapshot) -> ScheduleResult<()> {
    if catalog.class_group(slot.class_group_id).is_none() {
        return Err(ScheduleError::Validation(format!(
            "class-group {} is not in the catalog",
            slot.class_group_id
        )));
    }
    if catalog.subject(slot.subject_id).is_none() {
        return Err(ScheduleError::Validation(format!(
            "subject {} is not in the catalog",
            slot.subject_id
        )));
    }
    if catalog.room(slot.room_id).is_none() {
        return Err(ScheduleError::Validation(format!(
            "room {} is not in the catalog",
            slot.room_id
        )));
    }
    if catalog.lecturer(slot.lecturer_id).is_none() {
        return Err(ScheduleError::Validation(format!(
            "lecturer {} is not in the catalog",
            slot.lecturer_id
        )));
    }
    Ok(())
}

async fn with_retry<T, F, Fut>(operation: &str, mut attempt_fn: F) -> RepositoryResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RepositoryResult<T>>,
{
    let mut attempt = 1;
    loop {
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(operation, attempt, error = %err, "transient storage failure, retrying");
                tokio::time::sleep(RETRY_DELAY * attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(err.with_operation(operation)),
        }
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
