use actix_web::{web, HttpRequest, HttpResponse};

use sm_core::errors::{DomainError, TokenError};
use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use crate::dto::auth::RefreshResponse;

use super::cookie::{clear_cookie, read_refresh_token, refresh_cookie, with_cookie};
use super::{request_context, AppState};

/// Handler for POST /api/auth/refresh-token
///
/// Rotates the session in the refresh cookie. The presented token stops
/// working and a new one replaces it in the cookie.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accessToken": "eyJ...",
///     "expiresIn": 900
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, unknown, reused or expired refresh token.
///   The cookie is cleared.
pub async fn refresh_token<U, S, L, O>(
    req: HttpRequest,
    state: web::Data<AppState<U, S, L, O>>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    let session = &state.config.session;

    let result = match read_refresh_token(&req, session) {
        Some(token) => {
            let context = request_context(&req, &state.config.trusted_proxies);
            state.auth_service.refresh(&token, &context).await
        }
        None => Err(DomainError::Token(TokenError::InvalidRefreshToken)),
    };

    match result {
        Ok(auth) => {
            let cookie = refresh_cookie(&auth.refresh_token, auth.refresh_expires_in, session);
            with_cookie(
                HttpResponse::Ok().json(RefreshResponse::from(&auth)),
                &cookie,
            )
        }
        Err(error) => with_cookie(state.error_response(error), &clear_cookie(session)),
    }
}
