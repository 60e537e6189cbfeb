//! Authentication route handlers
//!
//! Every handler is generic over the repository implementations so the
//! same routes run against MySQL in production and in-memory mocks in
//! tests.

pub mod cookie;
pub mod login;
pub mod logout;
pub mod me;
pub mod password;
pub mod refresh;
pub mod register;
pub mod verification;

use std::net::IpAddr;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse};

use sm_core::domain::value_objects::RequestContext;
use sm_core::errors::DomainError;
use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};
use sm_core::services::AuthService;

use crate::config::ApiConfig;
use crate::handlers::handle_domain_error_with;

/// Application state that holds shared services
pub struct AppState<U, S, L, O>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    pub auth_service: Arc<AuthService<U, S, L, O>>,
    pub config: ApiConfig,
}

impl<U, S, L, O> AppState<U, S, L, O>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    pub fn new(auth_service: Arc<AuthService<U, S, L, O>>, config: ApiConfig) -> Self {
        Self {
            auth_service,
            config,
        }
    }

    /// Error response honoring the `debug_errors` setting
    pub fn error_response(&self, error: DomainError) -> HttpResponse {
        handle_domain_error_with(error, self.config.debug_errors)
    }
}

/// Client address and user agent recorded with sessions and login attempts
///
/// The address is the TCP peer. Forwarding headers are only honored when
/// the peer is one of `trusted_proxies`, so clients cannot pick the address
/// their failed logins are counted against.
pub fn request_context(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> RequestContext {
    let peer = req.peer_addr().map(|addr| addr.ip());
    let ip_address = match peer {
        Some(ip) if trusted_proxies.contains(&ip) => Some(
            req.connection_info()
                .realip_remote_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| ip.to_string()),
        ),
        Some(ip) => Some(ip.to_string()),
        None => None,
    };
    let user_agent = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    RequestContext::new(ip_address, user_agent)
}
