//! Transactional email delivery
//!
//! `HttpEmailSender` posts JSON to a mail API. `LogEmailSender` only logs
//! the delivery and is used when no API is configured.

mod http_sender;
mod log_sender;
pub mod templates;

use std::sync::Arc;

use sm_core::services::EmailSender;
use sm_shared::config::MailConfig;

use crate::InfrastructureError;

pub use http_sender::HttpEmailSender;
pub use log_sender::LogEmailSender;
pub use templates::RenderedEmail;

/// Create the email sender selected by configuration
pub fn create_email_sender(config: &MailConfig) -> Result<Arc<dyn EmailSender>, InfrastructureError> {
    match config.api_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            tracing::info!(api_url = %url, "Using HTTP mail API");
            Ok(Arc::new(HttpEmailSender::new(config.clone())?))
        }
        _ => {
            tracing::warn!("No mail API configured, emails will only be logged");
            Ok(Arc::new(LogEmailSender::new(config.site_url.clone())))
        }
    }
}
