//! Configuration for outbound collaborators (mail delivery, CAPTCHA)

use serde::{Deserialize, Serialize};

/// Transactional mail delivery settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    /// HTTP endpoint of the mail API; deliveries are only logged when unset
    pub api_url: Option<String>,

    /// Bearer key for the mail API
    pub api_key: Option<String>,

    /// Sender address
    pub from_address: String,

    /// Sender display name
    pub from_name: String,

    /// Public site URL used to build links in messages
    pub site_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from_address: String::from("noreply@slimmermetai.com"),
            from_name: String::from("SlimmerMetAI"),
            site_url: String::from("http://localhost:8080"),
            timeout_seconds: 10,
        }
    }
}

/// reCAPTCHA verification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Secret key; CAPTCHA checks are disabled when unset
    pub secret_key: Option<String>,

    /// Verification endpoint
    pub verify_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            verify_url: String::from("https://www.google.com/recaptcha/api/siteverify"),
            timeout_seconds: 10,
        }
    }
}

/// Background sweep settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Whether the sweep task runs
    pub enabled: bool,

    /// Seconds between sweeps
    pub interval_seconds: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
        }
    }
}
