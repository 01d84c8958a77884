//! Stack-related API endpoints

use crate::ControlPlaneClient;
use crate::error::Result;
use lightstack_core::domain::stack::{StackSpec, StackSummary};
use lightstack_core::dto::job::JobAccepted;
use lightstack_core::dto::stack::StackRemoved;

impl ControlPlaneClient {
    /// List provisioned stacks
    pub async fn list_stacks(&self) -> Result<Vec<StackSummary>> {
        let url = format!("{}/stacks", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Submit a stack for provisioning
    ///
    /// Returns as soon as the orchestrator accepted the job; use
    /// [`ControlPlaneClient::wait_for_job`] to follow it.
    pub async fn create_stack(&self, spec: &StackSpec) -> Result<JobAccepted> {
        let url = format!("{}/stacks", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(spec)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Remove a stack; blocks until the orchestrator confirmed removal
    pub async fn remove_stack(&self, stack_id: &str) -> Result<StackRemoved> {
        let url = format!("{}/stacks/{}", self.base_url, stack_id);
        let response = self.authorize(self.client.delete(&url)).send().await?;

        self.handle_response(response).await
    }
}
