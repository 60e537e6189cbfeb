//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT, sessions, lockout, password policy, one-time tokens, Google sign-in
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `external` - Mail delivery, CAPTCHA, background maintenance
//! - `server` - HTTP server and CORS configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod external;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{
    AuthConfig, GoogleOAuthConfig, JwtConfig, LockoutConfig, OneTimeTokenConfig,
    PasswordPolicyConfig, SessionConfig,
};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use external::{CaptchaConfig, MailConfig, MaintenanceConfig};
pub use server::{CorsConfig, ServerConfig};

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Mail delivery
    pub mail: MailConfig,

    /// CAPTCHA verification
    pub captcha: CaptchaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Background sweeps
    pub maintenance: MaintenanceConfig,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. built-in defaults
    /// 2. `config/default.toml` (optional)
    /// 3. `config/{environment}.toml` (optional)
    /// 4. `APP_`-prefixed environment variables, `__` separating nested keys
    ///    (e.g. `APP_AUTH__JWT__SECRET`)
    ///
    /// `.env` files are read into the process environment first.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        dotenvy::dotenv().ok();
        // Re-read: the .env files may have set APP_ENVIRONMENT
        let environment = Environment::from_env();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;
        app_config.environment = environment;
        if !environment.is_development() && app_config.logging.level == "debug" {
            app_config.logging = LoggingConfig::for_environment(environment);
        }
        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject settings that are unsafe outside development
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt.secret.len() < 32 && self.environment.is_production() {
            return Err(ConfigError::Invalid(
                "auth.jwt.secret must be at least 32 bytes in production".to_string(),
            ));
        }
        if !self.environment.is_development() {
            if self.auth.jwt.is_using_default_secret() {
                return Err(ConfigError::Invalid(
                    "auth.jwt.secret must be set outside development".to_string(),
                ));
            }
            if self.auth.session.token_hash_key == auth::DEFAULT_TOKEN_HASH_KEY {
                return Err(ConfigError::Invalid(
                    "auth.session.token_hash_key must be set outside development".to_string(),
                ));
            }
        }
        if self.auth.lockout.max_email_failures == 0 || self.auth.lockout.max_ip_failures == 0 {
            return Err(ConfigError::Invalid(
                "lockout thresholds must be greater than zero".to_string(),
            ));
        }
        if !(4..=31).contains(&self.auth.password.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "auth.password.bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }
        Ok(())
    }
}
