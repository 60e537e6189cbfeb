//! # Infrastructure Layer
//!
//! Concrete implementations of the ports declared in `sm_core`:
//! - **Database**: MySQL repositories using SQLx, connection pool and migrations
//! - **Mail**: transactional email over an HTTP API
//! - **Captcha**: reCAPTCHA response verification
//! - **OAuth**: Google ID token verification

use sm_core::errors::DomainError;
use thiserror::Error;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Transactional email delivery
pub mod mail;

/// CAPTCHA verification
pub mod captcha;

/// External identity providers
pub mod oauth;

mod http;

pub use captcha::RecaptchaVerifier;
pub use database::{
    DatabasePool, MySqlLoginAttemptRepository, MySqlOneTimeTokenRepository,
    MySqlSessionRepository, MySqlUserRepository, PoolStatistics,
};
pub use mail::{HttpEmailSender, LogEmailSender};
pub use oauth::GoogleIdentityVerifier;

/// Infrastructure-specific errors
#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
