//! Configuration for the token codec

use jsonwebtoken::Algorithm;
use sm_shared::JwtConfig;

/// Configuration for signing and verifying access tokens
#[derive(Debug, Clone)]
pub struct TokenCodecConfig {
    /// HMAC signing secret
    pub secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
}

impl Default for TokenCodecConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenCodecConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_ttl_seconds: config.access_token_expiry,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }
}
