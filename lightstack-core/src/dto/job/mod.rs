//! Job DTOs exchanged between the orchestrator API and its clients

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::JobStatus;

/// Response to an accepted stack submission
///
/// Returned with `202 Accepted`; the job itself is polled separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub message: String,
}
