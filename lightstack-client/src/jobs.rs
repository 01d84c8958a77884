//! Job-related API endpoints

use std::time::Duration;

use crate::ControlPlaneClient;
use crate::error::Result;
use lightstack_core::domain::job::Job;
use uuid::Uuid;

impl ControlPlaneClient {
    /// Get a job by ID
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// List all jobs known to the orchestrator, newest first
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/jobs", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Poll a job until it reaches Completed or Failed
    ///
    /// Polls forever if the job never finishes; wrap in
    /// `tokio::time::timeout` to bound the wait.
    pub async fn wait_for_job(&self, job_id: Uuid, interval: Duration) -> Result<Job> {
        loop {
            let job = self.get_job(job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }

            tracing::debug!("Job {} is {}, polling again", job_id, job.status);
            tokio::time::sleep(interval).await;
        }
    }
}
