//! Repository trait definitions for the weekly slot store.
//!
//! Storage backends implement these traits; everything above them (service
//! layer, planner, HTTP handlers) works against `dyn FullRepository` so
//! backends can be swapped without touching business logic.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::api::SlotId;
use crate::models::{CatalogSnapshot, NewSlot, WeeklySlot};

/// Repository trait for weekly slot templates.
///
/// # Write gating
///
/// `insert_slot` and `update_slot` run the resource-conflict check and the
/// commit as one atomic step: a candidate that collides on the room or
/// lecturer axis in its semester-and-day partition is rejected with
/// [`RepositoryError::Conflict`] and nothing is written. Two concurrent
/// writers can therefore never both pass the check and both commit.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Insert a new slot behind the conflict gate.
    ///
    /// # Returns
    /// * `Ok(WeeklySlot)` - The stored slot with its assigned id
    /// * `Err(RepositoryError::Conflict)` - If a committed slot blocks it
    async fn insert_slot(&self, slot: NewSlot) -> RepositoryResult<WeeklySlot>;

    /// Replace an existing slot in place, behind the conflict gate.
    /// The slot being edited is excluded from its own conflict check.
    ///
    /// # Returns
    /// * `Ok(WeeklySlot)` - The updated slot
    /// * `Err(RepositoryError::NotFound)` - If the id does not exist
    /// * `Err(RepositoryError::Conflict)` - If another slot blocks it
    async fn update_slot(&self, id: SlotId, slot: NewSlot) -> RepositoryResult<WeeklySlot>;

    /// Delete a slot. Already-projected sessions are unaffected since
    /// projection is always recomputed.
    ///
    /// # Returns
    /// * `Ok(WeeklySlot)` - The removed slot (used for change notification)
    /// * `Err(RepositoryError::NotFound)` - If the id does not exist
    async fn delete_slot(&self, id: SlotId) -> RepositoryResult<WeeklySlot>;

    /// Fetch a single slot by id.
    async fn get_slot(&self, id: SlotId) -> RepositoryResult<WeeklySlot>;

    /// Consistent snapshot of every committed slot, ordered by id.
    /// Conflict checks and projections run over this snapshot.
    async fn snapshot_slots(&self) -> RepositoryResult<Vec<WeeklySlot>>;

    /// Lightweight liveness probe for the health endpoint.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Repository trait for the resource catalog.
///
/// The catalog is reference data owned by administrative screens outside
/// this engine; the engine itself only ever reads it. `replace_catalog` is
/// the seam through which those screens publish updates.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Immutable copy of the whole catalog.
    async fn catalog_snapshot(&self) -> RepositoryResult<CatalogSnapshot>;

    /// Replace the catalog wholesale.
    async fn replace_catalog(&self, catalog: CatalogSnapshot) -> RepositoryResult<()>;
}

/// Combined repository interface used by application state.
pub trait FullRepository: SlotRepository + CatalogRepository {}

impl<T: SlotRepository + CatalogRepository> FullRepository for T {}
