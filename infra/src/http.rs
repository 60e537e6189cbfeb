//! Shared reqwest client construction

use std::time::Duration;

use reqwest::Client;

use crate::InfrastructureError;

pub(crate) const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with a bounded request timeout
pub(crate) fn build_client(timeout_seconds: u64) -> Result<Client, InfrastructureError> {
    let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;
    Ok(client)
}
