//! Single-use, expiring tokens stored as SHA-256 hashes

use std::sync::Arc;

use chrono::Duration;
use sha2::{Digest, Sha256};
use sm_shared::OneTimeTokenConfig;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::one_time_token::{ConsumeOutcome, OneTimeToken, TokenEffect, TokenKind};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::OneTimeTokenRepository;
use crate::services::session::generate_opaque_token;

/// Issues and consumes one-time tokens of a single kind
pub struct OneTimeTokenFlow<R: OneTimeTokenRepository> {
    repository: Arc<R>,
    kind: TokenKind,
    ttl: Duration,
}

impl<R: OneTimeTokenRepository> OneTimeTokenFlow<R> {
    pub fn new(repository: Arc<R>, kind: TokenKind, ttl: Duration) -> Self {
        Self {
            repository,
            kind,
            ttl,
        }
    }

    /// Flow for password reset tokens
    pub fn password_reset(repository: Arc<R>, config: &OneTimeTokenConfig) -> Self {
        Self::new(
            repository,
            TokenKind::PasswordReset,
            Duration::minutes(config.password_reset_ttl_minutes),
        )
    }

    /// Flow for email verification tokens
    pub fn email_verification(repository: Arc<R>, config: &OneTimeTokenConfig) -> Self {
        Self::new(
            repository,
            TokenKind::EmailVerification,
            Duration::hours(config.email_verification_ttl_hours),
        )
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// SHA-256 of a raw token, hex encoded
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Issues a fresh token for a user, invalidating earlier ones of this kind
    ///
    /// # Returns
    ///
    /// The raw token; only its hash is stored.
    pub async fn issue(&self, user_id: Uuid) -> DomainResult<String> {
        let token = generate_opaque_token();
        let record = OneTimeToken::new(user_id, Self::hash_token(&token), self.kind, self.ttl);
        self.repository.replace(record).await?;

        debug!(user_id = %user_id, kind = %self.kind, "One-time token issued");
        Ok(token)
    }

    /// Consumes a raw token and applies `effect` in the same transaction
    ///
    /// # Returns
    ///
    /// * `Ok(Uuid)` - Id of the token's owner
    /// * `Err(TokenError::OneTimeTokenNotFound)` - Unknown or already used
    /// * `Err(TokenError::OneTimeTokenExpired)` - Past its expiry
    pub async fn consume(&self, token: &str, effect: TokenEffect) -> DomainResult<Uuid> {
        let outcome = self
            .repository
            .consume(&Self::hash_token(token), self.kind, effect)
            .await?;

        match outcome {
            ConsumeOutcome::Consumed { user_id } => Ok(user_id),
            ConsumeOutcome::NotFound => Err(TokenError::OneTimeTokenNotFound.into()),
            ConsumeOutcome::Expired => Err(TokenError::OneTimeTokenExpired.into()),
        }
    }

    /// Removes expired and used tokens of every kind
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        self.repository.delete_expired().await
    }
}
