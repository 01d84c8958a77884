//! Job Service
//!
//! Read access to provisioning jobs for the API layer.

use lightstack_core::domain::job::Job;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::job_repository::JobRegistry;

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(Uuid),
}

/// Get a job by ID
pub async fn get_job(registry: &JobRegistry, id: Uuid) -> Result<Job, JobError> {
    registry.get(id).await.ok_or(JobError::NotFound(id))
}

/// List all jobs, newest first
pub async fn list_all_jobs(registry: &JobRegistry) -> Vec<Job> {
    registry.list().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightstack_core::domain::stack::StackSpec;

    #[tokio::test]
    async fn test_get_job_unknown_id() {
        let registry = JobRegistry::new();
        let id = Uuid::new_v4();
        let err = get_job(&registry, id).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(missing) if missing == id));
        assert_eq!(err.to_string(), format!("Job {} not found", id));
    }

    #[tokio::test]
    async fn test_get_job_returns_snapshot() {
        let registry = JobRegistry::new();
        let id = Uuid::new_v4();
        registry
            .create(
                id,
                StackSpec {
                    phoenixd_domain: "p.example.com".to_string(),
                    lnbits_domain: "l.example.com".to_string(),
                    use_real_certs: false,
                    use_postgres: false,
                    email: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(get_job(&registry, id).await.unwrap().id, id);
        assert_eq!(list_all_jobs(&registry).await.len(), 1);
    }
}
