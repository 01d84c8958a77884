//! Stack Service
//!
//! Synchronous list and remove operations. Both await the provisioning
//! script on the caller's task.

use std::collections::HashMap;
use std::sync::Arc;

use lightstack_core::domain::stack::StackSummary;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::service::process::ProcessRunner;
use crate::service::script::{self, ScriptLocation};

#[derive(Debug, Error)]
pub enum StackError {
    /// The script ran and exited non-zero; carries its stderr
    #[error("{0}")]
    ScriptFailed(String),
    /// The script could not be run at all
    #[error("{0}")]
    ExecutionError(String),
    #[error("Stack removal incomplete")]
    RemovalIncomplete(String),
}

#[derive(Clone)]
pub struct StackService {
    runner: Arc<dyn ProcessRunner>,
    script: ScriptLocation,
}

impl StackService {
    pub fn new(runner: Arc<dyn ProcessRunner>, script: ScriptLocation) -> Self {
        Self { runner, script }
    }

    /// List provisioned stacks as reported by the script
    pub async fn list(&self) -> Result<Vec<StackSummary>, StackError> {
        debug!("Using init script at: {}", self.script.script_path.display());

        let output = self
            .runner
            .run(self.script.request(script::LIST))
            .await
            .map_err(|e| StackError::ExecutionError(format!("{:#}", e)))?;

        if !output.success() {
            error!("Error listing stacks: {}", output.stderr.trim());
            return Err(StackError::ScriptFailed(
                output.error_message("Failed to list stacks"),
            ));
        }

        Ok(script::parse_stack_list(&output.stdout))
    }

    /// Remove a stack and confirm its directory is gone
    ///
    /// The script asks different questions depending on how many stacks
    /// exist, so the active count is read first. The directory check is the
    /// authoritative success signal; exit code 0 alone is not enough.
    pub async fn remove(&self, stack_id: &str) -> Result<String, StackError> {
        debug!("Removing stack {}", stack_id);

        let listing = self
            .runner
            .run(self.script.request(script::LIST))
            .await
            .map_err(|e| StackError::ExecutionError(format!("{:#}", e)))?;

        let active_stacks = script::count_active_stacks(&listing.stdout);
        debug!("Found {} active stacks", active_stacks);

        let transcript = script::removal_transcript(active_stacks, stack_id);
        debug!("Using input data: {:?}", transcript);

        let request = self
            .script
            .request(script::DEL)
            .stdin(transcript)
            .env(self.removal_env());

        let output = self
            .runner
            .run(request)
            .await
            .map_err(|e| StackError::ExecutionError(format!("{:#}", e)))?;

        debug!("Command stdout: {}", output.stdout);
        debug!("Command stderr: {}", output.stderr);

        if !output.success() {
            return Err(StackError::ScriptFailed(
                output.error_message("Failed to remove stack"),
            ));
        }

        let stack_dir = self.script.stack_dir(stack_id);
        if stack_dir.exists() {
            error!(
                "Stack {} still present at {} after removal",
                stack_id,
                stack_dir.display()
            );
            return Err(StackError::RemovalIncomplete(stack_id.to_string()));
        }

        info!("Stack {} removed", stack_id);
        Ok(format!("Stack {} removed successfully", stack_id))
    }

    /// `del` runs with only `PATH` and the installation root in its environment
    fn removal_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "PATH".to_string(),
            std::env::var("PATH").unwrap_or_default(),
        );
        env.insert(
            "SCRIPT_DIR".to_string(),
            self.script.install_root().display().to_string(),
        );
        env
    }
}
