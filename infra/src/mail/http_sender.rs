use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use sm_core::errors::{DomainError, DomainResult};
use sm_core::services::{EmailSender, EmailTemplate};
use sm_shared::config::MailConfig;
use sm_shared::validation::mask_email;

use super::templates::{self, RenderedEmail};
use crate::http::build_client;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
}

/// Request body sent to the mail API
#[derive(Debug, Serialize)]
struct MailPayload<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    tags: Vec<&'a str>,
}

/// Sends email through a JSON mail API with bearer authentication
pub struct HttpEmailSender {
    client: Client,
    config: MailConfig,
    api_url: String,
}

impl HttpEmailSender {
    /// # Errors
    /// `InfrastructureError::Config` when `api_url` is missing
    pub fn new(config: MailConfig) -> Result<Self, InfrastructureError> {
        let api_url = config
            .api_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("mail.api_url is not set".to_string()))?;
        let client = build_client(config.timeout_seconds)?;

        Ok(Self {
            client,
            config,
            api_url,
        })
    }

    fn payload<'a>(
        &'a self,
        to: &'a str,
        name: &'a str,
        template: EmailTemplate,
        email: &'a RenderedEmail,
    ) -> MailPayload<'a> {
        MailPayload {
            from: Address {
                email: &self.config.from_address,
                name: &self.config.from_name,
            },
            to: vec![Address { email: to, name }],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
            tags: vec![template.as_str()],
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(
        &self,
        to: &str,
        template: EmailTemplate,
        token: Option<&str>,
        name: &str,
    ) -> DomainResult<()> {
        let email = templates::render(template, &self.config.site_url, token, name)?;
        let payload = self.payload(to, name, template, &email);

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::from(InfrastructureError::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                to = %mask_email(to),
                template = template.as_str(),
                status = status.as_u16(),
                body = %body,
                "Mail API rejected message"
            );
            return Err(DomainError::Internal {
                message: format!("Mail API responded with {}", status),
            });
        }

        tracing::debug!(
            to = %mask_email(to),
            template = template.as_str(),
            "Email sent"
        );
        Ok(())
    }
}
