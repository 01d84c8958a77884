//! Stack Provisioning Service
//!
//! Accepts stack submissions and runs the provisioning script in the
//! background. `submit` returns as soon as the job is registered; the
//! outcome is published through the job registry.

use std::sync::Arc;

use lightstack_core::domain::stack::StackSpec;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::repository::job_repository::{JobRegistry, RegistryError};
use crate::service::process::ProcessRunner;
use crate::service::proxy::ProxyController;
use crate::service::script::{self, ScriptLocation};

/// Synchronous submission failures; no job exists when one of these is returned
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to reconfigure nginx")]
    ProxyReloadFailed,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Clone)]
pub struct ProvisioningService {
    registry: Arc<JobRegistry>,
    runner: Arc<dyn ProcessRunner>,
    proxy: Arc<dyn ProxyController>,
    script: ScriptLocation,
}

impl ProvisioningService {
    pub fn new(
        registry: Arc<JobRegistry>,
        runner: Arc<dyn ProcessRunner>,
        proxy: Arc<dyn ProxyController>,
        script: ScriptLocation,
    ) -> Self {
        Self {
            registry,
            runner,
            proxy,
            script,
        }
    }

    /// Register a provisioning job and start it in the background
    ///
    /// With real certificates the reverse proxy is reloaded first; if that
    /// fails nothing is registered and nothing runs.
    pub async fn submit(&self, spec: StackSpec) -> Result<Uuid, ProvisionError> {
        spec.validate().map_err(ProvisionError::ValidationError)?;

        if spec.use_real_certs {
            info!("Real certificates requested, reloading reverse proxy");
            if !self.proxy.reload().await {
                return Err(ProvisionError::ProxyReloadFailed);
            }
        }

        let transcript = script::provision_transcript(&spec);
        debug!("Provisioning transcript:\n[START]\n{}[END]", transcript);

        let job_id = Uuid::new_v4();
        let use_real_certs = spec.use_real_certs;
        self.registry.create(job_id, spec).await?;

        info!("Job {} created", job_id);

        let worker = self.clone();
        tokio::spawn(async move {
            worker.run_job(job_id, transcript, use_real_certs).await;
        });

        Ok(job_id)
    }

    /// Drive one job from Pending to a terminal state
    async fn run_job(self, job_id: Uuid, transcript: String, use_real_certs: bool) {
        match self.registry.mutate(job_id, |job| job.start()).await {
            Some(Ok(())) => info!("Job {} running", job_id),
            Some(Err(e)) => {
                error!("Job {} cannot start: {}", job_id, e);
                return;
            }
            None => {
                error!("Job {} vanished before it started", job_id);
                return;
            }
        }

        // The script call runs in its own task so a panic inside it still
        // ends in a Failed transition below.
        let this = self.clone();
        let outcome = match tokio::spawn(async move { this.provision(transcript).await }).await {
            Ok(outcome) => outcome,
            Err(e) => Err(format!("Provisioning worker crashed: {}", e)),
        };

        let transition = self
            .registry
            .mutate(job_id, |job| match &outcome {
                Ok(stack_id) => job.complete(stack_id.clone()),
                Err(message) => job.fail(message.clone()),
            })
            .await;

        match (&outcome, transition) {
            (Ok(stack_id), Some(Ok(()))) => {
                info!("Job {} completed: stack {}", job_id, stack_id)
            }
            (Err(message), Some(Ok(()))) => warn!("Job {} failed: {}", job_id, message),
            (_, Some(Err(e))) => error!("Job {} could not be finalized: {}", job_id, e),
            (_, None) => error!("Job {} vanished before it finished", job_id),
        }

        if outcome.is_err() && use_real_certs {
            // Put the proxy back in a consistent state after a half-done run.
            if !self.proxy.reload().await {
                warn!("Reverse proxy reload after failed job {} also failed", job_id);
            }
        }
    }

    /// Run `add` and turn its output into a stack id or an error message
    async fn provision(&self, transcript: String) -> Result<String, String> {
        let output = self
            .runner
            .run(self.script.request(script::ADD).stdin(transcript))
            .await
            .map_err(|e| format!("{:#}", e))?;

        debug!("Process stdout:\n{}", output.stdout);
        debug!("Process stderr:\n{}", output.stderr);

        if !output.success() {
            return Err(output.error_message("Failed to create stack"));
        }

        script::extract_stack_id(&output.stdout).ok_or_else(|| script::MISSING_STACK_ID.to_string())
    }
}
