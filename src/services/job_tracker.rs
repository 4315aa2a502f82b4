//! Job tracking for async batch placement.
//!
//! A simple in-memory tracker that stores progress logs for background
//! placement batches, plus the cancellation token the planner polls.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::scheduler::planner::CancelToken;

/// A single log entry with timestamp and message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        self != JobStatus::Running
    }
}

/// Job metadata and logs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub logs: Vec<LogEntry>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Result of the job (the plan summary if it ran to completion)
    pub result: Option<serde_json::Value>,
}

struct JobEntry {
    job: Job,
    cancel: CancelToken,
}

/// In-memory job tracker.
#[derive(Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl JobTracker {
    /// Create a new job tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job and return its ID.
    pub fn create_job(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        let entry = JobEntry {
            job: Job {
                job_id: job_id.clone(),
                status: JobStatus::Running,
                logs: vec![],
                created_at: chrono::Utc::now(),
                completed_at: None,
                result: None,
            },
            cancel: CancelToken::new(),
        };
        self.jobs.write().insert(job_id.clone(), entry);
        job_id
    }

    /// The cancellation token the job's worker polls.
    pub fn cancel_token(&self, job_id: &str) -> Option<CancelToken> {
        self.jobs.read().get(job_id).map(|e| e.cancel.clone())
    }

    /// Request cancellation of a running job. Returns false when the job is
    /// unknown or already finished.
    pub fn request_cancel(&self, job_id: &str) -> bool {
        let jobs = self.jobs.read();
        match jobs.get(job_id) {
            Some(entry) if entry.job.status == JobStatus::Running => {
                entry.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Add a log entry to a job.
    pub fn log(&self, job_id: &str, level: LogLevel, message: impl Into<String>) {
        let mut jobs = self.jobs.write();
        if let Some(entry) = jobs.get_mut(job_id) {
            entry.job.logs.push(LogEntry {
                timestamp: chrono::Utc::now(),
                level,
                message: message.into(),
            });
        }
    }

    /// Mark a job as completed with optional result.
    pub fn complete_job(&self, job_id: &str, result: Option<serde_json::Value>) {
        self.finish(job_id, JobStatus::Completed, result, None);
    }

    /// Mark a job as cancelled, keeping whatever partial result it produced.
    pub fn mark_cancelled(&self, job_id: &str, result: Option<serde_json::Value>) {
        self.finish(job_id, JobStatus::Cancelled, result, None);
    }

    /// Mark a job as failed.
    pub fn fail_job(&self, job_id: &str, error_message: impl Into<String>) {
        self.finish(job_id, JobStatus::Failed, None, Some(error_message.into()));
    }

    fn finish(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error_message: Option<String>,
    ) {
        let mut jobs = self.jobs.write();
        if let Some(entry) = jobs.get_mut(job_id) {
            entry.job.status = status;
            entry.job.completed_at = Some(chrono::Utc::now());
            entry.job.result = result;
            if let Some(message) = error_message {
                entry.job.logs.push(LogEntry {
                    timestamp: chrono::Utc::now(),
                    level: LogLevel::Error,
                    message,
                });
            }
        }
    }

    /// Get a job by ID.
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).map(|e| e.job.clone())
    }

    /// Get all logs for a job.
    pub fn get_logs(&self, job_id: &str) -> Vec<LogEntry> {
        self.jobs
            .read()
            .get(job_id)
            .map(|e| e.job.logs.clone())
            .unwrap_or_default()
    }
}
