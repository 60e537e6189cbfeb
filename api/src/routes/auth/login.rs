use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use sm_core::domain::value_objects::AuthResponse;
use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};
use sm_shared::config::SessionConfig;

use crate::dto::auth::{GoogleLoginRequest, LoginRequest};
use crate::handlers::handle_validation_errors;

use super::cookie::{refresh_cookie, with_cookie};
use super::{request_context, AppState};

/// 200 response with the token body and the refresh cookie
pub(crate) fn session_response(auth: &AuthResponse, config: &SessionConfig) -> HttpResponse {
    let cookie = refresh_cookie(&auth.refresh_token, auth.refresh_expires_in, config);
    with_cookie(HttpResponse::Ok().json(auth), &cookie)
}

/// Handler for POST /api/auth/login
///
/// Password login. Repeated failures first demand a CAPTCHA and then lock
/// the email or address out for the rest of the window.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "jan@example.com",
///     "password": "Str0ng!Pass1",
///     "remember": true,
///     "captchaToken": "optional"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accessToken": "eyJ...",
///     "expiresIn": 900,
///     "user": { ... }
/// }
/// ```
/// The refresh token is set as an `HttpOnly` cookie.
///
/// ## Errors
/// - 400 Bad Request: Missing fields, CAPTCHA required or failed
/// - 401 Unauthorized: Invalid credentials or unverified email
/// - 429 Too Many Requests: Locked out, with `Retry-After`
pub async fn login<U, S, L, O>(
    req: HttpRequest,
    state: web::Data<AppState<U, S, L, O>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    let context = request_context(&req, &state.config.trusted_proxies);
    match state
        .auth_service
        .login(
            &request.email,
            &request.password,
            request.remember,
            request.captcha_token.as_deref(),
            &context,
        )
        .await
    {
        Ok(auth) => session_response(&auth, &state.config.session),
        Err(error) => state.error_response(error),
    }
}

/// Handler for POST /api/auth/google
///
/// Signs in with a Google ID token, creating or linking the account.
/// Responds like [`login`].
pub async fn google_login<U, S, L, O>(
    req: HttpRequest,
    state: web::Data<AppState<U, S, L, O>>,
    request: web::Json<GoogleLoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    let context = request_context(&req, &state.config.trusted_proxies);
    match state.auth_service.oauth_login(&request.id_token, &context).await {
        Ok(auth) => session_response(&auth, &state.config.session),
        Err(error) => state.error_response(error),
    }
}
