//! In-memory repository for unit testing and local development.
//!
//! One `RwLock` guards the slot table. Gated writes (insert/update) take the
//! write lock once and run the conflict check and the mutation inside that
//! single critical section, so two concurrent writers can never both pass
//! the check and both commit.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::api::SlotId;
use crate::db::repository::{
    CatalogRepository, ErrorContext, RepositoryError, RepositoryResult, SlotRepository,
};
use crate::models::{CatalogSnapshot, NewSlot, WeeklySlot};
use crate::scheduler::conflict;

#[derive(Default)]
struct Inner {
    slots: HashMap<i64, WeeklySlot>,
    next_slot_id: i64,
    catalog: CatalogSnapshot,
}

/// In-memory implementation of the full repository.
pub struct LocalRepository {
    inner: RwLock<Inner>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: HashMap::new(),
                next_slot_id: 1,
                catalog: CatalogSnapshot::default(),
            }),
        }
    }

    /// Construct pre-seeded with a catalog, for tests and local bootstrap.
    pub fn with_catalog(catalog: CatalogSnapshot) -> Self {
        let repo = Self::new();
        repo.inner.write().catalog = catalog;
        repo
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotRepository for LocalRepository {
    async fn insert_slot(&self, slot: NewSlot) -> RepositoryResult<WeeklySlot> {
        let mut inner = self.inner.write();

        if let Some(hit) = conflict::conflict_for(&slot, inner.slots.values(), None) {
            return Err(RepositoryError::conflict(
                hit,
                ErrorContext::new("insert_slot").with_entity("slot"),
            ));
        }

        let id = inner.next_slot_id;
        inner.next_slot_id += 1;
        let stored = WeeklySlot::from_new(SlotId::new(id), slot);
        inner.slots.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_slot(&self, id: SlotId, slot: NewSlot) -> RepositoryResult<WeeklySlot> {
        let mut inner = self.inner.write();

        if !inner.slots.contains_key(&id.value()) {
            return Err(RepositoryError::not_found_with_context(
                format!("slot {} does not exist", id),
                ErrorContext::new("update_slot").with_entity("slot").with_entity_id(id),
            ));
        }

        if let Some(hit) = conflict::conflict_for(&slot, inner.slots.values(), Some(id)) {
            return Err(RepositoryError::conflict(
                hit,
                ErrorContext::new("update_slot").with_entity("slot").with_entity_id(id),
            ));
        }

        let stored = WeeklySlot::from_new(id, slot);
        inner.slots.insert(id.value(), stored.clone());
        Ok(stored)
    }

    async fn delete_slot(&self, id: SlotId) -> RepositoryResult<WeeklySlot> {
        self.inner.write().slots.remove(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("slot {} does not exist", id),
                ErrorContext::new("delete_slot").with_entity("slot").with_entity_id(id),
            )
        })
    }

    async fn get_slot(&self, id: SlotId) -> RepositoryResult<WeeklySlot> {
        self.inner.read().slots.get(&id.value()).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("slot {} does not exist", id),
                ErrorContext::new("get_slot").with_entity("slot").with_entity_id(id),
            )
        })
    }

    async fn snapshot_slots(&self) -> RepositoryResult<Vec<WeeklySlot>> {
        let mut slots: Vec<WeeklySlot> = self.inner.read().slots.values().cloned().collect();
        slots.sort_by_key(|slot| slot.id);
        Ok(slots)
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn catalog_snapshot(&self) -> RepositoryResult<CatalogSnapshot> {
        Ok(self.inner.read().catalog.clone())
    }

    async fn replace_catalog(&self, catalog: CatalogSnapshot) -> RepositoryResult<()> {
        self.inner.write().catalog = catalog;
        Ok(())
    }
}
