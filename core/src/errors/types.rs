//! Domain-specific error types for authentication and related operations
//!
//! Messages here are for logs; the presentation layer chooses what the
//! client sees.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong email or password; deliberately does not say which
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email address not verified")]
    EmailNotVerified,

    #[error("Account temporarily locked, retry after {retry_after_seconds} seconds")]
    AccountLocked { retry_after_seconds: u64 },

    #[error("CAPTCHA required")]
    CaptchaRequired,

    #[error("CAPTCHA verification failed")]
    CaptchaFailed,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    /// Malformed token or bad signature
    #[error("Invalid token")]
    InvalidToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// Unknown, already rotated or revoked refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("One-time token not found")]
    OneTimeTokenNotFound,

    #[error("One-time token expired")]
    OneTimeTokenExpired,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },
}

impl TokenError {
    /// Expired rather than invalid, for callers that prompt a silent re-auth
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            TokenError::TokenExpired | TokenError::RefreshTokenExpired | TokenError::OneTimeTokenExpired
        )
    }
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid length: {field} (max: {max})")]
    TooLong { field: String, max: usize },

    #[error("Weak password: {reason}")]
    WeakPassword { reason: String },

    #[error("Missing identity claim: {claim}")]
    MissingIdentityClaim { claim: String },
}
