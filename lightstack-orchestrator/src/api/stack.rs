//! Stack API Handlers
//!
//! HTTP endpoints for listing, provisioning and removing stacks.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use lightstack_core::domain::job::JobStatus;
use lightstack_core::domain::stack::{StackSpec, StackSummary};
use lightstack_core::dto::job::JobAccepted;
use lightstack_core::dto::stack::StackRemoved;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /stacks
/// List provisioned stacks
pub async fn list_stacks(State(state): State<AppState>) -> ApiResult<Json<Vec<StackSummary>>> {
    tracing::debug!("Listing stacks");

    let stacks = state.stacks.list().await?;
    Ok(Json(stacks))
}

/// POST /stacks
/// Submit a provisioning job; the result is polled through /jobs/{id}
pub async fn create_stack(
    State(state): State<AppState>,
    Json(spec): Json<StackSpec>,
) -> ApiResult<(StatusCode, Json<JobAccepted>)> {
    tracing::info!(
        "Adding new stack: phoenixd={} lnbits={} real_certs={} postgres={}",
        spec.phoenixd_domain,
        spec.lnbits_domain,
        spec.use_real_certs,
        spec.use_postgres
    );

    let job_id = state.provisioning.submit(spec).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted {
            job_id,
            status: JobStatus::Pending,
            message: "Stack creation started".to_string(),
        }),
    ))
}

/// DELETE /stacks/{stack_id}
/// Remove a stack synchronously
pub async fn remove_stack(
    State(state): State<AppState>,
    Path(stack_id): Path<String>,
) -> ApiResult<Json<StackRemoved>> {
    tracing::info!("Removing stack: {}", stack_id);

    if stack_id.is_empty() || !stack_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::BadRequest(format!(
            "Invalid stack id: {}",
            stack_id
        )));
    }

    let message = state.stacks.remove(&stack_id).await?;
    Ok(Json(StackRemoved { message }))
}
