//! Service layer for business logic and orchestration.
//!
//! Sits between the repository and the external callers (HTTP façade,
//! bindings): projection of templates into dated sessions, the read-side
//! query façade, change notification, and async batch placement jobs.

pub mod batch_processor;
pub mod job_tracker;
pub mod notifier;
pub mod projection;
pub mod queries;

pub use notifier::{ChangeKind, ChangeNotifier, ScheduleChange, TracingNotifier};
pub use projection::{project, WindowPolicy};
pub use queries::{
    current_week, free_resources, history_window, list_slots, upcoming, FreeResources, SlotFilter,
};
