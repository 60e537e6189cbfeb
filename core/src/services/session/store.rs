//! Opaque refresh tokens persisted as keyed hashes

use std::sync::Arc;

use chrono::Duration;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sm_shared::SessionConfig;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RotateOutcome};
use crate::domain::value_objects::RequestContext;
use crate::errors::{DomainResult, TokenError};
use crate::repositories::SessionRepository;

/// 32 random bytes, hex encoded
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A freshly created session together with its raw token
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Raw token, only ever handed to the client
    pub token: String,
    pub record: RefreshToken,
}

impl IssuedSession {
    pub fn expires_in_seconds(&self) -> i64 {
        self.record.time_until_expiration().num_seconds()
    }
}

/// Result of a successful rotation
#[derive(Debug, Clone)]
pub struct Rotation {
    /// Raw successor token
    pub token: String,
    pub record: RefreshToken,
    pub user_id: Uuid,
}

/// Persists refresh sessions and enforces single-use rotation
pub struct SessionStore<S: SessionRepository> {
    repository: Arc<S>,
    config: SessionConfig,
}

impl<S: SessionRepository> SessionStore<S> {
    pub fn new(repository: Arc<S>, config: SessionConfig) -> Self {
        Self { repository, config }
    }

    /// Keyed SHA-256 of a raw token, hex encoded
    ///
    /// The server-held key acts as a salt while keeping lookups by hash
    /// deterministic.
    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.config.token_hash_key.as_bytes());
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Lifetime in seconds of a session with the given remember flag
    pub fn ttl_seconds(&self, remember: bool) -> i64 {
        self.config.ttl_for(remember)
    }

    /// Creates a session for a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - Owner of the session
    /// * `context` - Client metadata stored with the session
    /// * `remember` - Selects the long lifetime
    pub async fn create(
        &self,
        user_id: Uuid,
        context: &RequestContext,
        remember: bool,
    ) -> DomainResult<IssuedSession> {
        let token = generate_opaque_token();
        let record = RefreshToken::new(
            user_id,
            self.hash_token(&token),
            remember,
            Duration::seconds(self.ttl_seconds(remember)),
            context,
        );
        let record = self.repository.create(record).await?;

        debug!(user_id = %user_id, remember, "Refresh session created");
        Ok(IssuedSession { token, record })
    }

    /// Exchanges a refresh token for its successor
    ///
    /// # Returns
    ///
    /// * `Ok(Rotation)` - The old token is gone, the new one is stored
    /// * `Err(TokenError::InvalidRefreshToken)` - Unknown or already used token
    /// * `Err(TokenError::RefreshTokenExpired)` - Token expired (and was deleted)
    pub async fn rotate(&self, old_token: &str, context: &RequestContext) -> DomainResult<Rotation> {
        let token = generate_opaque_token();
        let outcome = self
            .repository
            .rotate(&self.hash_token(old_token), self.hash_token(&token), context)
            .await?;

        match outcome {
            RotateOutcome::Rotated { current, .. } => Ok(Rotation {
                token,
                user_id: current.user_id,
                record: current,
            }),
            RotateOutcome::NotFound => Err(TokenError::InvalidRefreshToken.into()),
            RotateOutcome::Expired => Err(TokenError::RefreshTokenExpired.into()),
        }
    }

    /// Deletes the session of a raw token
    ///
    /// # Returns
    ///
    /// `Ok(false)` when no session matched; callers treat that as success.
    pub async fn revoke(&self, token: &str) -> DomainResult<bool> {
        self.repository.delete_by_hash(&self.hash_token(token)).await
    }

    /// Deletes every session of a user
    pub async fn revoke_all(&self, user_id: Uuid) -> DomainResult<usize> {
        let revoked = self.repository.delete_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "Revoked all refresh sessions");
        Ok(revoked)
    }

    /// Removes expired sessions
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        self.repository.delete_expired().await
    }
}
