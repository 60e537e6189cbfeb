use actix_web::{web, HttpResponse};
use validator::Validate;

use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use crate::dto::auth::{ChangePasswordRequest, EmailRequest, MessageResponse, ResetPasswordRequest};
use crate::handlers::handle_validation_errors;
use crate::middleware::auth::AuthContext;

use super::cookie::{clear_cookie, with_cookie};
use super::AppState;

const RESET_REQUESTED: &str =
    "If an account exists for this email address, a password reset link has been sent.";

/// Handler for POST /api/auth/forgot-password
///
/// Sends a reset link when the account exists. The answer is the same
/// either way so the endpoint cannot be used to probe for accounts.
///
/// ## Errors
/// - 400 Bad Request: Malformed body
pub async fn forgot_password<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    request: web::Json<EmailRequest>,
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

    match state.auth_service.forgot_password(&request.email).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new(RESET_REQUESTED)),
        Err(error) => state.error_response(error),
    }
}

/// Handler for POST /api/auth/reset-password
///
/// Consumes a reset token and sets the new password.
///
/// ## Errors
/// - 400 Bad Request: Weak password, or a token that is unknown, used or expired
pub async fn reset_password<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    request: web::Json<ResetPasswordRequest>,
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

    match state
        .auth_service
        .reset_password(&request.token, &request.password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new(
            "Your password has been reset. You can now log in.",
        )),
        Err(error) => state.error_response(error),
    }
}

/// Handler for POST /api/auth/change-password
///
/// Requires a Bearer token. On success every session of the user ends and
/// the refresh cookie is cleared.
///
/// ## Errors
/// - 400 Bad Request: Weak new password
/// - 401 Unauthorized: Wrong current password or missing access token
pub async fn change_password<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    auth: AuthContext,
    request: web::Json<ChangePasswordRequest>,
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

    match state
        .auth_service
        .change_password(auth.user_id, &request.current_password, &request.new_password)
        .await
    {
        Ok(()) => with_cookie(
            HttpResponse::Ok().json(MessageResponse::new(
                "Your password has been changed. Please log in again.",
            )),
            &clear_cookie(&state.config.session),
        ),
        Err(error) => state.error_response(error),
    }
}
