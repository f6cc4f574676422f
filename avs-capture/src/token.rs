//! Operator token validation gate
//!
//! A capture session starts only after a positive validation result. A
//! transport failure is an error, not a pass: the gate is never bypassed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("avs-capture/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// External token validator interface
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Returns `Ok(true)` when the token is valid. Transport failures are
    /// `Err(Error::Token)`.
    async fn validate(&self, token: &str) -> Result<bool>;
}

/// Fixed-outcome validator for offline deployments and tests.
///
/// An empty or whitespace token is always rejected.
pub struct StaticTokenValidator {
    valid: bool,
}

impl StaticTokenValidator {
    pub fn new(valid: bool) -> Self {
        Self { valid }
    }

    pub fn always_valid() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<bool> {
        if token.trim().is_empty() {
            return Ok(false);
        }
        Ok(self.valid)
    }
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
}

/// Validator backed by the remote verification API
/// (`GET {base}/validate-token?token=…`, responding `{"valid": bool}`)
pub struct HttpTokenValidator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTokenValidator {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Token(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> Result<bool> {
        if token.trim().is_empty() {
            return Ok(false);
        }

        let url = format!("{}/validate-token", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| Error::Token(format!("validation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Token(format!(
                "validation endpoint returned {}",
                response.status()
            )));
        }

        let body: ValidateResponse = response
            .json()
            .await
            .map_err(|e| Error::Token(format!("invalid validation response: {}", e)))?;

        tracing::debug!(valid = body.valid, "Token validation completed");
        Ok(body.valid)
    }
}
