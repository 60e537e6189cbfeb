use actix_web::{web, HttpRequest, HttpResponse};

use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use crate::dto::auth::MessageResponse;
use crate::middleware::auth::AuthContext;

use super::cookie::{clear_cookie, read_refresh_token, with_cookie};
use super::AppState;

/// Handler for POST /api/auth/logout
///
/// Ends the session in the refresh cookie and clears the cookie. Always
/// answers 200; a missing or unknown session is not an error.
pub async fn logout<U, S, L, O>(
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

    if let Some(token) = read_refresh_token(&req, session) {
        if let Err(error) = state.auth_service.logout(&token).await {
            tracing::warn!(error = %error, "Failed to end session on logout");
        }
    }

    with_cookie(
        HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")),
        &clear_cookie(session),
    )
}

/// Handler for POST /api/auth/logout-all
///
/// Ends every session of the authenticated user.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
pub async fn logout_all<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    match state.auth_service.logout_all(auth.user_id).await {
        Ok(ended) => {
            tracing::info!(user_id = %auth.user_id, sessions = ended, "Logged out everywhere");
            with_cookie(
                HttpResponse::Ok().json(MessageResponse::new("Logged out on all devices")),
                &clear_cookie(&state.config.session),
            )
        }
        Err(error) => state.error_response(error),
    }
}
