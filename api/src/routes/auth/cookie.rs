//! Refresh token cookie
//!
//! The refresh token never appears in a response body. It travels in an
//! `HttpOnly`, `SameSite=Strict` cookie whose lifetime follows the session.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};

use sm_shared::config::SessionConfig;

/// Cookie carrying `token` for `max_age_seconds`
pub fn refresh_cookie(token: &str, max_age_seconds: i64, config: &SessionConfig) -> Cookie<'static> {
    build(token.to_string(), Duration::seconds(max_age_seconds.max(0)), config)
}

/// Cookie that makes the browser drop the refresh token
pub fn clear_cookie(config: &SessionConfig) -> Cookie<'static> {
    build(String::new(), Duration::ZERO, config)
}

fn build(value: String, max_age: Duration, config: &SessionConfig) -> Cookie<'static> {
    let mut builder = Cookie::build(config.cookie_name.clone(), value)
        .path(config.cookie_path.clone())
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(max_age);

    if let Some(domain) = config.cookie_domain.as_ref().filter(|d| !d.is_empty()) {
        builder = builder.domain(domain.clone());
    }

    builder.finish()
}

/// Refresh token sent by the browser, if any
pub fn read_refresh_token(req: &HttpRequest, config: &SessionConfig) -> Option<String> {
    req.cookie(&config.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Attaches `cookie` to an already built response
pub fn with_cookie(mut response: HttpResponse, cookie: &Cookie<'_>) -> HttpResponse {
    if let Err(e) = response.add_cookie(cookie) {
        tracing::error!(error = %e, "Failed to set refresh cookie");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn config() -> SessionConfig {
        SessionConfig {
            cookie_secure: true,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = refresh_cookie("abc", 28_800, &config());

        assert_eq!(cookie.name(), config().cookie_name);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(28_800)));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie(&config());

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_domain_only_when_configured() {
        let mut config = config();
        assert!(refresh_cookie("abc", 60, &config).domain().is_none());

        config.cookie_domain = Some("slimmermetai.com".to_string());
        assert_eq!(
            refresh_cookie("abc", 60, &config).domain(),
            Some("slimmermetai.com")
        );
    }

    #[test]
    fn test_read_refresh_token_ignores_empty_value() {
        let config = config();
        let req = TestRequest::default()
            .cookie(Cookie::new(config.cookie_name.clone(), ""))
            .to_http_request();
        assert!(read_refresh_token(&req, &config).is_none());

        let req = TestRequest::default()
            .cookie(Cookie::new(config.cookie_name.clone(), "token"))
            .to_http_request();
        assert_eq!(read_refresh_token(&req, &config).as_deref(), Some("token"));
    }
}
