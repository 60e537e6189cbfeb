//! MySQL repository implementations

mod login_attempt_repository_impl;
mod one_time_token_repository_impl;
mod session_repository_impl;
mod user_repository_impl;

pub use login_attempt_repository_impl::MySqlLoginAttemptRepository;
pub use one_time_token_repository_impl::MySqlOneTimeTokenRepository;
pub use session_repository_impl::MySqlSessionRepository;
pub use user_repository_impl::MySqlUserRepository;

use sm_core::errors::DomainError;

/// Wraps a SQLx error with a short description of the failed operation
pub(crate) fn db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::Internal {
        message: format!("{}: {}", action, e),
    }
}

/// True when the error is a unique key violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Parses a CHAR(36) identifier column
pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<uuid::Uuid, DomainError> {
    uuid::Uuid::parse_str(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", column, e),
    })
}
