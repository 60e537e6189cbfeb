//! Translation of domain errors into HTTP responses

use actix_web::{http::header, http::StatusCode, HttpResponse};
use sm_core::errors::{AuthError, DomainError, TokenError};
use sm_shared::{error_codes, ErrorResponse};
use validator::ValidationErrors;

const INVALID_OR_EXPIRED_TOKEN: &str = "The link is invalid or has expired";
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INTERNAL_ERROR: &str = "An internal error occurred";

/// Status, code and client-facing message for a domain error
pub fn classify(error: &DomainError) -> (StatusCode, &'static str, String) {
    match error {
        DomainError::Validation { message } => (
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            message.clone(),
        ),
        DomainError::ValidationErr(e) => (
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            e.to_string(),
        ),
        DomainError::NotFound { .. } => (
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_OR_EXPIRED_TOKEN,
            INVALID_OR_EXPIRED_TOKEN.to_string(),
        ),
        DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            INTERNAL_ERROR.to_string(),
        ),
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                error_codes::INVALID_CREDENTIALS,
                INVALID_CREDENTIALS.to_string(),
            ),
            AuthError::EmailNotVerified => (
                StatusCode::UNAUTHORIZED,
                error_codes::EMAIL_NOT_VERIFIED,
                "Please verify your email address before logging in".to_string(),
            ),
            AuthError::AccountLocked { retry_after_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                error_codes::TOO_MANY_ATTEMPTS,
                format!(
                    "Too many failed attempts. Try again in {} seconds",
                    retry_after_seconds
                ),
            ),
            AuthError::CaptchaRequired => (
                StatusCode::BAD_REQUEST,
                error_codes::CAPTCHA_REQUIRED,
                "Please complete the CAPTCHA".to_string(),
            ),
            AuthError::CaptchaFailed => (
                StatusCode::BAD_REQUEST,
                error_codes::CAPTCHA_FAILED,
                "CAPTCHA verification failed".to_string(),
            ),
            AuthError::UserAlreadyExists => (
                StatusCode::CONFLICT,
                error_codes::EMAIL_TAKEN,
                "An account with this email address already exists".to_string(),
            ),
            AuthError::UserNotFound => (
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_OR_EXPIRED_TOKEN,
                INVALID_OR_EXPIRED_TOKEN.to_string(),
            ),
            AuthError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                error_codes::FORBIDDEN,
                "Insufficient permissions".to_string(),
            ),
        },
        DomainError::Token(token) => match token {
            TokenError::TokenExpired | TokenError::RefreshTokenExpired => (
                StatusCode::UNAUTHORIZED,
                error_codes::TOKEN_EXPIRED,
                "Token has expired".to_string(),
            ),
            TokenError::InvalidToken
            | TokenError::InvalidRefreshToken
            | TokenError::MissingClaim { .. } => (
                StatusCode::UNAUTHORIZED,
                error_codes::TOKEN_INVALID,
                "Invalid token".to_string(),
            ),
            TokenError::OneTimeTokenNotFound | TokenError::OneTimeTokenExpired => (
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_OR_EXPIRED_TOKEN,
                INVALID_OR_EXPIRED_TOKEN.to_string(),
            ),
            TokenError::TokenGenerationFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                INTERNAL_ERROR.to_string(),
            ),
        },
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    handle_domain_error_with(error, false)
}

/// Like `handle_domain_error`; `debug_errors` adds the internal message to 5xx bodies
pub fn handle_domain_error_with(error: DomainError, debug_errors: bool) -> HttpResponse {
    let (status, code, message) = classify(&error);

    if status.is_server_error() {
        tracing::error!(error = %error, code, "Request failed");
    } else {
        tracing::warn!(error = %error, code, status = status.as_u16(), "Request rejected");
    }

    let mut body = ErrorResponse::new(code, message);
    if debug_errors && status.is_server_error() {
        body = body.add_detail("debug", error.to_string());
    }

    let mut response = HttpResponse::build(status);
    if let DomainError::Auth(AuthError::AccountLocked { retry_after_seconds }) = &error {
        response.insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()));
        body = body.add_detail("retry_after", retry_after_seconds);
    }
    response.json(body)
}

/// 400 response listing the fields that failed request validation
pub fn handle_validation_errors(errors: ValidationErrors) -> HttpResponse {
    let fields: Vec<String> = errors.field_errors().keys().map(|f| f.to_string()).collect();
    tracing::warn!(fields = ?fields, "Request body failed validation");

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request body")
            .add_detail("fields", fields),
    )
}

/// 401 response for requests without usable credentials
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(
        error_codes::UNAUTHORIZED,
        "Authentication required",
    ))
}
