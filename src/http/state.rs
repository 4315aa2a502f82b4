//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::job_tracker::JobTracker;
use crate::services::notifier::{ChangeNotifier, TracingNotifier};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for storage operations
    pub repository: Arc<dyn FullRepository>,
    /// Tracker for background batch placement jobs
    pub job_tracker: JobTracker,
    /// Dispatcher invoked once per successful schedule mutation
    pub notifier: Arc<dyn ChangeNotifier>,
}

impl AppState {
    /// Create a new application state with the given repository and the
    /// default log-based notifier.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            job_tracker: JobTracker::new(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Swap in a different change notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
