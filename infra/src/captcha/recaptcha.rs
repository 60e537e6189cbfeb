//! Google reCAPTCHA `siteverify` client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use sm_core::errors::{DomainError, DomainResult};
use sm_core::services::CaptchaVerifier;
use sm_shared::config::CaptchaConfig;

use crate::http::build_client;
use crate::InfrastructureError;

/// Response body of the verification endpoint
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
    #[serde(default)]
    hostname: Option<String>,
}

/// Verifies reCAPTCHA response tokens against Google
pub struct RecaptchaVerifier {
    client: Client,
    secret_key: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    /// Build a verifier, or `None` when no secret key is configured
    pub fn from_config(config: &CaptchaConfig) -> Result<Option<Self>, InfrastructureError> {
        let secret_key = match config.secret_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key.to_string(),
            _ => return Ok(None),
        };

        Ok(Some(Self {
            client: build_client(config.timeout_seconds)?,
            secret_key,
            verify_url: config.verify_url.clone(),
        }))
    }

    fn parse(body: &str) -> DomainResult<bool> {
        let response: SiteVerifyResponse =
            serde_json::from_str(body).map_err(|e| DomainError::Internal {
                message: format!("Unexpected CAPTCHA response: {}", e),
            })?;

        if !response.success {
            tracing::warn!(
                error_codes = ?response.error_codes,
                hostname = ?response.hostname,
                "CAPTCHA rejected"
            );
        }
        Ok(response.success)
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> DomainResult<bool> {
        if token.trim().is_empty() {
            return Ok(false);
        }

        let mut form = vec![("secret", self.secret_key.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self
            .client
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::from(InfrastructureError::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Internal {
                message: format!("CAPTCHA provider responded with {}", status),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::from(InfrastructureError::Http(e)))?;
        Self::parse(&body)
    }
}
