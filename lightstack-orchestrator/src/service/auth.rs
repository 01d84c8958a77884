//! Auth Service
//!
//! Checks the admin credentials and issues/verifies HS256 bearer tokens.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Failed to issue token: {0}")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

pub struct AuthService {
    admin_user: String,
    admin_pass: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &str, admin_user: String, admin_pass: String, token_ttl: Duration) -> Self {
        Self {
            admin_user,
            admin_pass,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.admin_user.clone(),
            config.admin_pass.clone(),
            config.token_ttl,
        )
    }

    /// Exchange credentials for a signed access token
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        debug!("Authentication attempt for user: {}", username);

        if username != self.admin_user || password != self.admin_pass {
            debug!("Authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims {
            sub: username.to_string(),
            exp: jsonwebtoken::get_current_timestamp() + self.token_ttl.as_secs(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        debug!("Authentication succeeded, token issued");
        Ok(token)
    }

    /// Validate a bearer token and return the user it was issued to
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.sub != self.admin_user {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims.sub)
    }
}
