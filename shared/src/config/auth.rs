//! Authentication and session configuration

use serde::{Deserialize, Serialize};

/// Placeholder JWT secret; rejected outside development
pub const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// Placeholder key for hashing refresh tokens; rejected outside development
pub const DEFAULT_TOKEN_HASH_KEY: &str = "development-hash-key-please-change-in-production";

/// JWT access token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC secret used to sign access tokens
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_expiry: 3600, // 1 hour
            issuer: String::from("slimmermetai"),
            audience: String::from("slimmermetai-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Refresh session and cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a regular session in seconds
    pub ttl_seconds: i64,

    /// Lifetime of a "remember me" session in seconds
    pub remember_ttl_seconds: i64,

    /// Server-held key mixed into refresh token hashes
    pub token_hash_key: String,

    /// Refresh cookie name
    pub cookie_name: String,

    /// Refresh cookie path
    pub cookie_path: String,

    /// Refresh cookie domain, host-only when unset
    pub cookie_domain: Option<String>,

    /// Refresh cookie secure flag (HTTPS only)
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 8 * 3600,                // 8 hours
            remember_ttl_seconds: 30 * 24 * 3600, // 30 days
            token_hash_key: DEFAULT_TOKEN_HASH_KEY.to_string(),
            cookie_name: String::from("refresh_token"),
            cookie_path: String::from("/"),
            cookie_domain: None,
            cookie_secure: true,
        }
    }
}

impl SessionConfig {
    /// Session lifetime in seconds for the given remember flag
    pub fn ttl_for(&self, remember: bool) -> i64 {
        if remember {
            self.remember_ttl_seconds
        } else {
            self.ttl_seconds
        }
    }
}

/// Brute-force lockout thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockoutConfig {
    /// Trailing window over which failures are counted, in minutes
    pub window_minutes: i64,

    /// Failures per email before a hard lock
    pub max_email_failures: u32,

    /// Failures per IP before a hard lock
    pub max_ip_failures: u32,

    /// Failures per email after which a CAPTCHA is required
    pub captcha_email_failures: u32,

    /// Failures per IP after which a CAPTCHA is required
    pub captcha_ip_failures: u32,

    /// How long attempt rows are kept, in hours
    pub retention_hours: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            window_minutes: 15,
            max_email_failures: 5,
            max_ip_failures: 25,
            captcha_email_failures: 3,
            captcha_ip_failures: 15,
            retention_hours: 24,
        }
    }
}

impl LockoutConfig {
    /// Retention in minutes, never shorter than the lockout window
    pub fn effective_retention_minutes(&self) -> i64 {
        (self.retention_hours * 60).max(self.window_minutes)
    }
}

/// Password hashing and strength rules
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordPolicyConfig {
    /// bcrypt work factor
    pub bcrypt_cost: u32,

    /// Minimum password length
    pub min_length: usize,

    /// Number of character classes (lower, upper, digit, symbol) required
    pub min_character_classes: usize,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 12,
            min_length: 8,
            min_character_classes: 3,
        }
    }
}

/// Lifetimes of single-use tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OneTimeTokenConfig {
    /// Password reset token lifetime in minutes
    pub password_reset_ttl_minutes: i64,

    /// Email verification token lifetime in hours
    pub email_verification_ttl_hours: i64,
}

impl Default for OneTimeTokenConfig {
    fn default() -> Self {
        Self {
            password_reset_ttl_minutes: 60,
            email_verification_ttl_hours: 24,
        }
    }
}

/// Google sign-in configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GoogleOAuthConfig {
    /// OAuth client id the ID token audience must match
    pub client_id: Option<String>,

    /// Token info endpoint
    pub tokeninfo_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            tokeninfo_url: String::from("https://oauth2.googleapis.com/tokeninfo"),
            timeout_seconds: 10,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Lockout thresholds
    pub lockout: LockoutConfig,

    /// Password rules
    pub password: PasswordPolicyConfig,

    /// One-time token lifetimes
    pub one_time_tokens: OneTimeTokenConfig,

    /// Google sign-in
    pub google: GoogleOAuthConfig,

    /// Block login until the email address is verified
    pub require_email_verification: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            session: SessionConfig::default(),
            lockout: LockoutConfig::default(),
            password: PasswordPolicyConfig::default(),
            one_time_tokens: OneTimeTokenConfig::default(),
            google: GoogleOAuthConfig::default(),
            require_email_verification: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 3600);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret").with_access_expiry_minutes(30);
        assert_eq!(config.access_token_expiry, 1800);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_session_ttl_for_remember() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl_for(false), 8 * 3600);
        assert_eq!(config.ttl_for(true), 30 * 24 * 3600);
        assert_eq!(config.cookie_name, "refresh_token");
    }

    #[test]
    fn test_lockout_retention_never_below_window() {
        let config = LockoutConfig {
            window_minutes: 120,
            retention_hours: 1,
            ..Default::default()
        };
        assert_eq!(config.effective_retention_minutes(), 120);
        assert_eq!(LockoutConfig::default().effective_retention_minutes(), 24 * 60);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"lockout": {"max_email_failures": 7}}"#).unwrap();
        assert_eq!(config.lockout.max_email_failures, 7);
        assert_eq!(config.lockout.window_minutes, 15);
        assert_eq!(config.password.min_length, 8);
    }
}
