//! Configuration for the authentication service

use sm_shared::AuthConfig;

/// Policy switches of the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Block password login until the email address is verified
    pub require_email_verification: bool,
    /// Maximum length of a display name
    pub max_name_length: usize,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            require_email_verification: true,
            max_name_length: 100,
        }
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            require_email_verification: config.require_email_verification,
            ..Self::default()
        }
    }
}
