//! Change notification seam.
//!
//! The engine reports every successful slot create/edit/delete exactly once;
//! delivering the message to class members (push, hub fan-out, e-mail) is
//! the collaborating notification system's job, behind [`ChangeNotifier`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ClassGroupId, SlotId};
use crate::models::{CatalogSnapshot, WeeklySlot};

/// What happened to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    fn headline(self) -> &'static str {
        match self {
            ChangeKind::Created => "New class scheduled",
            ChangeKind::Updated => "Class schedule changed",
            ChangeKind::Deleted => "Class cancelled",
        }
    }
}

/// One schedule change, described for human consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleChange {
    pub kind: ChangeKind,
    pub slot_id: SlotId,
    /// The class-group whose members are affected; resolving the member
    /// list is the dispatcher's responsibility.
    pub class_group_id: ClassGroupId,
    pub title: String,
    pub description: String,
}

impl ScheduleChange {
    /// Build the human-readable description for a changed slot, resolving
    /// subject and room names from the catalog where available.
    pub fn describe(kind: ChangeKind, slot: &WeeklySlot, catalog: &CatalogSnapshot) -> Self {
        let subject = catalog
            .subject(slot.subject_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("subject {}", slot.subject_id));
        let room = catalog
            .room(slot.room_id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("room {}", slot.room_id));

        Self {
            kind,
            slot_id: slot.id,
            class_group_id: slot.class_group_id,
            title: kind.headline().to_string(),
            description: format!(
                "{} - {} {} in {}",
                subject,
                slot.day,
                slot.start.format("%H:%M"),
                room
            ),
        }
    }
}

/// Dispatcher invoked once per successful schedule mutation.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn slot_changed(&self, change: ScheduleChange);
}

/// Default notifier: emits the change as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl ChangeNotifier for TracingNotifier {
    async fn slot_changed(&self, change: ScheduleChange) {
        info!(
            kind = ?change.kind,
            slot_id = change.slot_id.value(),
            class_group = change.class_group_id.value(),
            title = %change.title,
            description = %change.description,
            "schedule change"
        );
    }
}
