//! One-time token repository trait for password reset and email verification.

use async_trait::async_trait;

use crate::domain::entities::one_time_token::{ConsumeOutcome, OneTimeToken, TokenEffect, TokenKind};
use crate::errors::DomainError;

/// Repository trait for OneTimeToken persistence operations
///
/// At most one unused token per (user, kind) exists at any time.
#[async_trait]
pub trait OneTimeTokenRepository: Send + Sync {
    /// Store a token, deleting unused tokens of the same kind for the same user
    ///
    /// Both statements run in one transaction.
    ///
    /// # Returns
    /// * `Ok(OneTimeToken)` - The stored token
    /// * `Err(DomainError)` - Database error occurred
    async fn replace(&self, token: OneTimeToken) -> Result<OneTimeToken, DomainError>;

    /// Find a token by hash and kind, used or not
    async fn find_by_hash(
        &self,
        token_hash: &str,
        kind: TokenKind,
    ) -> Result<Option<OneTimeToken>, DomainError>;

    /// Atomically consume a token and apply its effect to the owning user
    ///
    /// Within a single transaction: lock the unused row matching `token_hash`
    /// and `kind`, check expiry, apply `effect` to the user, and set `used_at`.
    ///
    /// # Returns
    /// * `Ok(ConsumeOutcome::Consumed { user_id })` - Token used, effect applied
    /// * `Ok(ConsumeOutcome::NotFound)` - Unknown or already used token
    /// * `Ok(ConsumeOutcome::Expired)` - Token expired, nothing changed
    async fn consume(
        &self,
        token_hash: &str,
        kind: TokenKind,
        effect: TokenEffect,
    ) -> Result<ConsumeOutcome, DomainError>;

    /// Delete tokens that are expired or already used
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn delete_expired(&self) -> Result<usize, DomainError>;
}
