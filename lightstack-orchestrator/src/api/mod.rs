//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod auth;
pub mod error;
pub mod health;
pub mod job;
pub mod stack;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::repository::job_repository::JobRegistry;
use crate::service::auth_service::AuthService;
use crate::service::process::{ProcessRunner, TokioProcessRunner};
use crate::service::provision_service::ProvisioningService;
use crate::service::proxy::{CommandProxyController, ProxyController};
use crate::service::script::ScriptLocation;
use crate::service::stack_service::StackService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub provisioning: ProvisioningService,
    pub stacks: StackService,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wire services around the given process runner and proxy controller
    pub fn new(
        config: &Config,
        runner: Arc<dyn ProcessRunner>,
        proxy: Arc<dyn ProxyController>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let script = ScriptLocation::from_config(config);

        Self {
            provisioning: ProvisioningService::new(
                registry.clone(),
                runner.clone(),
                proxy,
                script.clone(),
            ),
            stacks: StackService::new(runner, script),
            auth: Arc::new(AuthService::from_config(config)),
            registry,
        }
    }

    /// Production wiring: real processes and the configured proxy commands
    pub fn from_config(config: &Config) -> Self {
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());
        let proxy = Arc::new(CommandProxyController::new(
            runner.clone(),
            config.proxy.clone(),
        ));
        Self::new(config, runner, proxy)
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Stack endpoints
        .route("/stacks", get(stack::list_stacks))
        .route("/stacks", post(stack::create_stack))
        .route("/stacks/{stack_id}", delete(stack::remove_stack))
        // Job endpoints
        .route("/jobs", get(job::list_jobs))
        .route("/jobs/{job_id}", get(job::get_job))
        // Everything above needs a bearer token
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_bearer,
        ))
        .route("/token", post(auth::issue_token))
        .route("/health", get(health::health_check))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;
    use std::time::{Duration, Instant};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::CommandSpec;
    use crate::service::testing::write_script;

    const SCRIPT: &str = r#"case "$1" in
add) cat > /dev/null; echo "Creating stack_12"; echo "stack_12 created" ;;
list)
    echo "Stacks:"
    echo "1) stack_12"
    echo '{"id":"12","phoenixd_domain":"p.example.com","lnbits_domain":"l.example.com"}' ;;
del) rm -rf stack_12 ;;
esac"#;

    struct Fixture {
        dir: tempfile::TempDir,
        router: Router,
    }

    fn fixture(script_body: &str, reload_ok: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "init.sh", script_body);
        let reload = write_script(
            dir.path(),
            "reload.sh",
            if reload_ok { "exit 0" } else { "exit 1" },
        );

        let mut config = Config::new(
            dir.path(),
            "test-secret".to_string(),
            "admin".to_string(),
            "hunter2".to_string(),
        );
        config.script_path = script;
        config.proxy.reload = CommandSpec::parse(&reload.display().to_string()).unwrap();

        let router = create_router(AppState::from_config(&config));
        Fixture { dir, router }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(router: &Router) -> String {
        let req = Request::builder()
            .method("POST")
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=hunter2"))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    fn authed(method: &str, uri: &str, token: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap()
    }

    async fn poll_job(router: &Router, token: &str, job_id: &str) -> Value {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let resp = router
                .clone()
                .oneshot(authed("GET", &format!("/jobs/{}", job_id), token, Body::empty()))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let job = body_json(resp).await;
            if job["status"] == "Completed" || job["status"] == "Failed" {
                return job;
            }
            assert!(Instant::now() < deadline, "job never finished");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    const SPEC: &str = r#"{"phoenixd_domain":"p.example.com","lnbits_domain":"l.example.com"}"#;

    #[tokio::test]
    async fn test_health_requires_no_auth() {
        let f = fixture(SCRIPT, true);
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let resp = f.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_missing_token() {
        let f = fixture(SCRIPT, true);
        for uri in ["/stacks", "/jobs"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let resp = f.router.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");
        }
    }

    #[tokio::test]
    async fn test_protected_routes_reject_bogus_token() {
        let f = fixture(SCRIPT, true);
        let resp = f
            .router
            .clone()
            .oneshot(authed("GET", "/stacks", "totally-bogus", Body::empty()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_rejects_bad_password() {
        let f = fixture(SCRIPT, true);
        let req = Request::builder()
            .method("POST")
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=wrong"))
            .unwrap();

        let resp = f.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(resp).await["error"],
            "Incorrect username or password"
        );
    }

    #[tokio::test]
    async fn test_list_stacks() {
        let f = fixture(SCRIPT, true);
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("GET", "/stacks", &token, Body::empty()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], "12");
        assert_eq!(body[0]["lnbits_domain"], "l.example.com");
    }

    #[tokio::test]
    async fn test_list_stacks_script_failure_is_500_with_stderr() {
        let f = fixture("echo 'list exploded' >&2; exit 1", true);
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("GET", "/stacks", &token, Body::empty()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], "list exploded");
    }

    #[tokio::test]
    async fn test_create_stack_then_poll_job() {
        let f = fixture(SCRIPT, true);
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("POST", "/stacks", &token, Body::from(SPEC)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let accepted = body_json(resp).await;
        assert_eq!(accepted["status"], "Pending");
        let job_id = accepted["job_id"].as_str().unwrap().to_string();

        let job = poll_job(&f.router, &token, &job_id).await;
        assert_eq!(job["status"], "Completed");
        assert_eq!(job["result_stack_id"], "12");
        assert!(job.get("error_message").is_none());
        assert_eq!(job["request"]["phoenixd_domain"], "p.example.com");

        let resp = f
            .router
            .clone()
            .oneshot(authed("GET", "/jobs", &token, Body::empty()))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_job_is_only_visible_through_polling() {
        let f = fixture("echo done", true);
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("POST", "/stacks", &token, Body::from(SPEC)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let job_id = body_json(resp).await["job_id"].as_str().unwrap().to_string();

        let job = poll_job(&f.router, &token, &job_id).await;
        assert_eq!(job["status"], "Failed");
        assert_eq!(job["error_message"], "Failed to extract stack ID");
        assert!(job.get("result_stack_id").is_none());
    }

    #[tokio::test]
    async fn test_create_stack_proxy_failure_is_synchronous() {
        let f = fixture(SCRIPT, false);
        let token = login(&f.router).await;

        let body = serde_json::json!({
            "phoenixd_domain": "p.example.com",
            "lnbits_domain": "l.example.com",
            "use_real_certs": true,
            "email": "ops@example.com",
        })
        .to_string();
        let resp = f
            .router
            .clone()
            .oneshot(authed("POST", "/stacks", &token, Body::from(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], "Failed to reconfigure nginx");

        let resp = f
            .router
            .clone()
            .oneshot(authed("GET", "/jobs", &token, Body::empty()))
            .await
            .unwrap();
        assert!(body_json(resp).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_stack_rejects_line_breaks() {
        let f = fixture(SCRIPT, true);
        let token = login(&f.router).await;

        let body = r#"{"phoenixd_domain":"p.example.com\ny","lnbits_domain":"l.example.com"}"#;
        let resp = f
            .router
            .clone()
            .oneshot(authed("POST", "/stacks", &token, Body::from(body)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let f = fixture(SCRIPT, true);
        let token = login(&f.router).await;

        for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
            let resp = f
                .router
                .clone()
                .oneshot(authed("GET", &format!("/jobs/{}", id), &token, Body::empty()))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_remove_stack() {
        let f = fixture(SCRIPT, true);
        let root: &Path = f.dir.path();
        std::fs::create_dir(root.join("stack_12")).unwrap();
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("DELETE", "/stacks/12", &token, Body::empty()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await["message"],
            "Stack 12 removed successfully"
        );
        assert!(!root.join("stack_12").exists());
    }

    #[tokio::test]
    async fn test_remove_stack_incomplete() {
        let f = fixture(SCRIPT, true);
        let root = f.dir.path();
        std::fs::create_dir(root.join("stack_7")).unwrap();
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("DELETE", "/stacks/7", &token, Body::empty()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], "Stack removal incomplete");
    }

    #[tokio::test]
    async fn test_remove_stack_rejects_non_numeric_id() {
        let f = fixture(SCRIPT, true);
        let token = login(&f.router).await;

        let resp = f
            .router
            .clone()
            .oneshot(authed("DELETE", "/stacks/..%2Fetc", &token, Body::empty()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
