//! Stateless access token signing and verification

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::token::AccessClaims;
use crate::domain::entities::user::UserRole;
use crate::errors::{DomainError, TokenError};

use super::config::TokenCodecConfig;

/// Signs and verifies HS256 access tokens
///
/// Holds no mutable state and performs no I/O, so one instance can be
/// shared across all request handlers.
pub struct TokenCodec {
    config: TokenCodecConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a new codec from its configuration
    pub fn new(config: TokenCodecConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Lifetime of tokens minted by `issue_default`, in seconds
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.config.access_token_ttl_seconds
    }

    /// Signs an access token valid for `ttl`
    ///
    /// # Arguments
    ///
    /// * `user_id` - Subject of the token
    /// * `email` - Email claim
    /// * `role` - Role claim
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The encoded token
    /// * `Err(DomainError)` - Signing failed
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        ttl: Duration,
    ) -> Result<String, DomainError> {
        let claims = AccessClaims::new(
            user_id,
            email,
            role,
            ttl,
            &self.config.issuer,
            &self.config.audience,
        );

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|_| TokenError::TokenGenerationFailed.into())
    }

    /// Signs an access token with the configured lifetime
    pub fn issue_default(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> Result<String, DomainError> {
        self.issue(
            user_id,
            email,
            role,
            Duration::seconds(self.config.access_token_ttl_seconds),
        )
    }

    /// Verifies signature, issuer, audience and expiry of an access token
    ///
    /// # Returns
    ///
    /// * `Ok(AccessClaims)` - The decoded claims
    /// * `Err(TokenError::TokenExpired)` - `exp` is not in the future
    /// * `Err(TokenError::InvalidToken)` - Anything else is wrong with the token
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::InvalidToken,
            },
        )?;

        // jsonwebtoken still accepts exp == now
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::TokenExpired);
        }

        Ok(data.claims)
    }
}
