//! In-memory collaborators for tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::value_objects::OAuthAssertion;
use crate::errors::{AuthError, DomainError, DomainResult};

use super::traits::{CaptchaVerifier, EmailSender, EmailTemplate, IdentityVerifier};

/// An email captured by `RecordingEmailSender`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub template: EmailTemplate,
    pub token: Option<String>,
    pub name: String,
}

/// Records every email instead of sending it
#[derive(Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: bool,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose deliveries always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }

    /// Token of the most recent email with the given template
    pub async fn last_token(&self, template: EmailTemplate) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|e| e.template == template)
            .and_then(|e| e.token.clone())
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(
        &self,
        to: &str,
        template: EmailTemplate,
        token: Option<&str>,
        name: &str,
    ) -> DomainResult<()> {
        if self.fail {
            return Err(DomainError::internal("mail service unavailable"));
        }
        self.sent.lock().await.push(SentEmail {
            to: to.to_string(),
            template,
            token: token.map(str::to_string),
            name: name.to_string(),
        });
        Ok(())
    }
}

/// Accepts exactly one CAPTCHA response value
#[derive(Clone)]
pub struct StaticCaptchaVerifier {
    valid_token: String,
    calls: Arc<Mutex<u32>>,
}

impl StaticCaptchaVerifier {
    pub fn new(valid_token: impl Into<String>) -> Self {
        Self {
            valid_token: valid_token.into(),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn calls(&self) -> u32 {
        *self.calls.lock().await
    }
}

#[async_trait]
impl CaptchaVerifier for StaticCaptchaVerifier {
    async fn verify(&self, token: &str, _remote_ip: Option<&str>) -> DomainResult<bool> {
        *self.calls.lock().await += 1;
        Ok(token == self.valid_token)
    }
}

/// Maps known ID tokens to fixed assertions
#[derive(Clone, Default)]
pub struct StaticIdentityVerifier {
    assertions: Arc<Mutex<HashMap<String, OAuthAssertion>>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id_token: impl Into<String>, assertion: OAuthAssertion) {
        self.assertions.lock().await.insert(id_token.into(), assertion);
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> DomainResult<OAuthAssertion> {
        self.assertions
            .lock()
            .await
            .get(id_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }
}
