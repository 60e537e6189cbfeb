use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::OAuthAssertion;
use crate::errors::DomainResult;

/// Transactional emails sent by the authentication flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    /// Contains an email verification link
    Verification,
    /// Contains a password reset link
    PasswordReset,
    /// Sent after the address has been verified
    Welcome,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::Verification => "verification",
            EmailTemplate::PasswordReset => "password_reset",
            EmailTemplate::Welcome => "welcome",
        }
    }
}

/// Delivers transactional email
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one templated email
    ///
    /// # Arguments
    /// * `to` - Recipient address
    /// * `template` - Which email to send
    /// * `token` - Raw one-time token to embed in the link, if the template has one
    /// * `name` - Recipient display name
    async fn send(
        &self,
        to: &str,
        template: EmailTemplate,
        token: Option<&str>,
        name: &str,
    ) -> DomainResult<()>;
}

/// Checks CAPTCHA responses
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// # Returns
    /// * `Ok(true)` - The response token is valid
    /// * `Ok(false)` - The provider rejected the token
    /// * `Err(DomainError)` - The provider could not be reached
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> DomainResult<bool>;
}

/// Turns a provider ID token into a verified assertion
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// # Returns
    /// * `Ok(OAuthAssertion)` - Token verified for this application
    /// * `Err(DomainError::Auth(AuthError::InvalidCredentials))` - Token rejected
    async fn verify_id_token(&self, id_token: &str) -> DomainResult<OAuthAssertion>;
}
