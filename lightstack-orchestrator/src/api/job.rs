//! Job API Handlers
//!
//! Polling endpoints for provisioning jobs.

use axum::{
    Json,
    extract::{Path, State},
};
use lightstack_core::domain::job::Job;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::job_service;

/// GET /jobs/{job_id}
/// Get job details by ID
///
/// An id that is not a UUID cannot name a job, so it is reported as not found.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", job_id);

    let id = Uuid::parse_str(&job_id)
        .map_err(|_| ApiError::NotFound(format!("Job {} not found", job_id)))?;

    let job = job_service::get_job(&state.registry, id).await?;
    Ok(Json(job))
}

/// GET /jobs
/// List all jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    tracing::debug!("Listing all jobs");

    Json(job_service::list_all_jobs(&state.registry).await)
}
