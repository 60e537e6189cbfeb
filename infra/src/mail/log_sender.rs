use async_trait::async_trait;

use sm_core::errors::DomainResult;
use sm_core::services::{EmailSender, EmailTemplate};
use sm_shared::validation::mask_email;

use super::templates;

/// Development sender that logs each delivery instead of sending it
#[derive(Debug, Clone)]
pub struct LogEmailSender {
    site_url: String,
}

impl LogEmailSender {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(
        &self,
        to: &str,
        template: EmailTemplate,
        token: Option<&str>,
        name: &str,
    ) -> DomainResult<()> {
        let email = templates::render(template, &self.site_url, token, name)?;
        tracing::info!(
            to = %mask_email(to),
            template = template.as_str(),
            subject = %email.subject,
            link = %email.link,
            "Email delivery logged"
        );
        Ok(())
    }
}
