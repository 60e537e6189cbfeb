use actix_web::{web, HttpResponse};
use validator::Validate;

use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use crate::dto::auth::{RegisterRequest, RegisterResponse};
use crate::handlers::handle_validation_errors;

use super::AppState;

/// Handler for POST /api/auth/register
///
/// Creates an unverified account and sends the verification email.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "jan@example.com",
///     "password": "Str0ng!Pass1",
///     "name": "Jan"
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {
///     "message": "Registration successful. Please check your email to verify your account.",
///     "user": { "id": "...", "email": "jan@example.com", "name": "Jan", ... }
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed email, blank name or weak password
/// - 409 Conflict: Email already registered
pub async fn register<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    request: web::Json<RegisterRequest>,
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
        .register(&request.email, &request.password, &request.name)
        .await
    {
        Ok(user) => HttpResponse::Created().json(RegisterResponse {
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            user,
        }),
        Err(error) => state.error_response(error),
    }
}
