use actix_web::{web, HttpResponse};

use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use crate::dto::auth::CurrentUserResponse;
use crate::middleware::auth::BearerToken;

use super::AppState;

/// Handler for GET /api/auth/me
///
/// Identity carried by the access token. No database lookup.
///
/// ## Errors
/// - 401 Unauthorized: Missing, malformed or expired access token
pub async fn me<U, S, L, O>(
    state: web::Data<AppState<U, S, L, O>>,
    token: BearerToken,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    match state.auth_service.current_user(&token.0).await {
        Ok(user) => HttpResponse::Ok().json(CurrentUserResponse { user }),
        Err(error) => state.error_response(error),
    }
}
