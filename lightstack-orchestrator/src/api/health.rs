//! Health Check API Handler
//!
//! Simple health check endpoint for monitoring.

use axum::Json;

/// GET /health
/// Health check endpoint; needs no token
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
