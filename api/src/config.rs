//! Settings the HTTP layer needs at request time

use std::net::IpAddr;

use sm_shared::config::{AppConfig, SessionConfig};

/// Request-time settings shared by all handlers
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Refresh cookie name, path, domain, secure flag and lifetimes
    pub session: SessionConfig,

    /// Include internal error details in 5xx bodies
    pub debug_errors: bool,

    /// Maximum JSON body size in bytes
    pub max_payload_size: usize,

    /// Peers allowed to report the client address in forwarding headers
    pub trusted_proxies: Vec<IpAddr>,
}

impl ApiConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            session: config.auth.session.clone(),
            debug_errors: config.server.debug_errors,
            max_payload_size: config.server.max_payload_size,
            trusted_proxies: parse_proxies(&config.server.trusted_proxies),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

fn parse_proxies(entries: &[String]) -> Vec<IpAddr> {
    entries
        .iter()
        .filter_map(|entry| match entry.trim().parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(entry = %entry, "Ignoring invalid trusted proxy address");
                None
            }
        })
        .collect()
}
