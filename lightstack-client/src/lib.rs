//! Lightstack HTTP Client
//!
//! A typed HTTP client for the Lightstack orchestrator API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use lightstack_client::ControlPlaneClient;
//! use lightstack_core::domain::stack::StackSpec;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = ControlPlaneClient::new("http://localhost:8005");
//!     client.login("admin", "secret").await?;
//!
//!     let accepted = client.create_stack(&StackSpec {
//!         phoenixd_domain: "phoenixd.example.com".to_string(),
//!         lnbits_domain: "lnbits.example.com".to_string(),
//!         use_real_certs: false,
//!         use_postgres: false,
//!         email: None,
//!     }).await?;
//!
//!     let job = client.wait_for_job(accepted.job_id, Duration::from_secs(2)).await?;
//!     println!("Job finished: {:?}", job.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod stacks;

// Re-export commonly used types
pub use error::{ClientError, Result};

use lightstack_core::dto::auth::TokenResponse;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the Lightstack orchestrator API
///
/// Endpoints are grouped into:
/// - Authentication (token exchange)
/// - Stack management (list, create, remove)
/// - Job polling
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8005")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token sent with protected requests
    token: Option<String>,
}

impl ControlPlaneClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API (e.g., "http://localhost:8005")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Use an already issued access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current access token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // =============================================================================
    // Authentication
    // =============================================================================

    /// Exchange credentials for an access token and keep it for later calls
    pub async fn login(&mut self, username: &str, password: &str) -> Result<TokenResponse> {
        let url = format!("{}/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let token: TokenResponse = self.handle_response(response).await?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    /// Check that the orchestrator is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }

    /// Attach the bearer token, when one is set
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    /// Build an error from a failed response, preferring the API's `error` field
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = error_message(&text);

        match status {
            401 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::api_error(status, message),
        }
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
