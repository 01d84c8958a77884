//! Job Registry
//!
//! In-memory store of every provisioning job. It is the single source of
//! truth for job state seen by API callers. All access goes through one
//! `RwLock`, so a reader never observes a half-applied transition.
//!
//! Records are never evicted: the map grows with every submission for the
//! lifetime of the process.

use std::collections::HashMap;

use lightstack_core::domain::job::Job;
use lightstack_core::domain::stack::StackSpec;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("job {0} already exists")]
    AlreadyExists(Uuid),
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending job
    ///
    /// Never overwrites an existing record.
    pub async fn create(&self, id: Uuid, spec: StackSpec) -> Result<Job, RegistryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }

        let job = Job::new(id, spec);
        jobs.insert(id, job.clone());
        Ok(job)
    }

    /// Point-in-time copy of a job
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Apply `f` to the stored record under the write lock
    ///
    /// Returns `None` when no job has this id.
    pub async fn mutate<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut Job) -> R,
    {
        let mut jobs = self.jobs.write().await;
        jobs.get_mut(&id).map(f)
    }

    /// All jobs, newest first
    pub async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
