//! Job domain types
//!
//! A job is one tracked attempt to provision a stack. Its lifecycle is
//! `Pending -> Running -> {Completed | Failed}`; the transition methods on
//! [`Job`] are the only way to move between states.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::stack::StackSpec;

/// Provisioning job record
///
/// Owned by the orchestrator's job registry; API callers only ever see clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub request: StackSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_stack_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and Failed never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Rejected state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid job transition {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

impl Job {
    /// Creates a new pending job for the given request
    pub fn new(id: Uuid, request: StackSpec) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            request,
            result_stack_id: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Pending -> Running
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.expect_status(JobStatus::Pending, JobStatus::Running)?;
        self.status = JobStatus::Running;
        self.started_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// Running -> Completed, recording the provisioned stack id
    pub fn complete(&mut self, stack_id: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_status(JobStatus::Running, JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.result_stack_id = Some(stack_id.into());
        self.completed_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// Running -> Failed, recording the reason
    ///
    /// An empty message is replaced so a failed job always explains itself.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_status(JobStatus::Running, JobStatus::Failed)?;
        let message = message.into();
        self.status = JobStatus::Failed;
        self.error_message = Some(if message.trim().is_empty() {
            "Job failed".to_string()
        } else {
            message
        });
        self.completed_at = Some(chrono::Utc::now());
        Ok(())
    }

    fn expect_status(&self, expected: JobStatus, to: JobStatus) -> Result<(), TransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.status,
                to,
            })
        }
    }
}
