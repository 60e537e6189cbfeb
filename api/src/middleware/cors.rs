//! CORS middleware configuration for cross-origin requests.
//!
//! Browsers call the API from the site origin with credentials, since the
//! refresh token travels in a cookie.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use sm_shared::config::{CorsConfig, Environment};

/// Creates a CORS middleware instance for the configured origins.
///
/// An empty list or a `*` entry allows any origin, which production logs
/// as a warning. Otherwise only the listed origins are accepted.
pub fn create_cors(config: &CorsConfig, environment: Environment) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(config.max_age)
        .supports_credentials();

    if config.allows_any_origin() {
        if environment.is_production() {
            tracing::warn!("CORS allows any origin in production");
        }
        return cors.allow_any_origin();
    }

    config
        .allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .fold(cors, |cors, origin| {
            tracing::info!(origin, "Adding allowed origin");
            cors.allowed_origin(origin)
        })
}
