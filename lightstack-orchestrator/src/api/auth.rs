//! Auth API Handlers
//!
//! Token issuance and the bearer-token guard applied to protected routes.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use lightstack_core::dto::auth::{TokenRequest, TokenResponse};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::auth_service::{AuthError, AuthService};

/// POST /token
/// Exchange form-encoded credentials for a bearer token
pub async fn issue_token(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.auth.login(&req.username, &req.password)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// Reject requests without a valid `Authorization: Bearer <token>` header
pub async fn require_bearer(
    State(auth): State<Arc<AuthService>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::InvalidToken)?;

    let user = auth.verify(token)?;
    tracing::debug!("Authenticated request from {}", user);

    Ok(next.run(req).await)
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
