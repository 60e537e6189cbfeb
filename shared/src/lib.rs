//! Shared utilities and common types for the SlimmerMetAI server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and loading
//! - Error response structures
//! - Input validation helpers (email normalisation, masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CaptchaConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    GoogleOAuthConfig, JwtConfig, LockoutConfig, LoggingConfig, MailConfig, MaintenanceConfig,
    OneTimeTokenConfig, PasswordPolicyConfig, ServerConfig, SessionConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::validation;
