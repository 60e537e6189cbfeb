use actix_web::{web, HttpResponse};
use validator::Validate;

use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use crate::dto::auth::{EmailRequest, MessageResponse, VerifyEmailRequest};
use crate::handlers::handle_validation_errors;

use super::AppState;

/// Handler for POST /api/auth/verify-email
///
/// Consumes a verification token and marks the email address verified.
///
/// ## Errors
/// - 400 Bad Request: Token unknown, used or expired
pub async fn verify_email<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    request: web::Json<VerifyEmailRequest>,
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

    match state.auth_service.verify_email(&request.token).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Email address verified");
            HttpResponse::Ok().json(MessageResponse::new(
                "Your email address has been verified. You can now log in.",
            ))
        }
        Err(error) => state.error_response(error),
    }
}

/// Handler for POST /api/auth/resend-verification
///
/// Sends a fresh verification link to an unverified account. Answers the
/// same for unknown and already verified addresses.
pub async fn resend_verification<U, S, L, O>(
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

    match state.auth_service.resend_verification(&request.email).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new(
            "If this account still needs verification, a new link has been sent.",
        )),
        Err(error) => state.error_response(error),
    }
}
