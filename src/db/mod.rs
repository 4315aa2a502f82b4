//! Storage module for the weekly slot store.
//!
//! This module provides abstractions for slot storage via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! The storage module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, bulk import adapters)     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! │  - Structural validation                                 │
//! │  - Bounded retry of transient failures                   │
//! │  - Change notification                                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! │  - Conflict-gated slot writes                            │
//! │  - Catalog snapshots                                     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! **For new code, use the service layer:**
//! ```ignore
//! use timetable_rust::db::{self, services};
//! use timetable_rust::services::TracingNotifier;
//!
//! async fn example(slot: timetable_rust::models::NewSlot) -> anyhow::Result<()> {
//!     db::init_repository()?;
//!     let repo = db::get_repository()?;
//!     let stored = services::create_slot(repo.as_ref(), &TracingNotifier, slot).await?;
//!     println!("created slot {}", stored.id);
//!     Ok(())
//! }
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// ==================== Service Layer (Recommended for new code) ====================
// Use these high-level functions that work with any repository implementation

pub use services::{
    create_slot, delete_slot, edit_slot, health_check, ScheduleError, ScheduleResult,
};

// ==================== Repository Pattern Exports ====================

pub use repo_config::RepositoryConfig;

// Repository trait and implementations
pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    CatalogRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    SlotRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Backend selection order: `repository.toml` if present, then the
/// `REPOSITORY_TYPE` environment variable, then the local default.
fn create_selected_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    let repo_type = match RepositoryConfig::from_default_location() {
        Ok(config) => config
            .repository_type()
            .map_err(RepositoryError::configuration)?,
        Err(_) => RepositoryType::from_env(),
    };
    RepositoryFactory::create(repo_type)
}

/// Initialize the global repository singleton for the selected backend.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = create_selected_repository().map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
