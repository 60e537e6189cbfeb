//! Mock implementation of OneTimeTokenRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::one_time_token::{ConsumeOutcome, OneTimeToken, TokenEffect, TokenKind};
use crate::errors::DomainError;
use crate::repositories::user::{MockUserRepository, UserRepository};

use super::trait_::OneTimeTokenRepository;

/// Mock one-time token repository
///
/// Shares its user store with a `MockUserRepository` so that consumed
/// tokens can apply their effect the way the database transaction does.
#[derive(Clone)]
pub struct MockOneTimeTokenRepository {
    tokens: Arc<RwLock<HashMap<String, OneTimeToken>>>,
    users: MockUserRepository,
}

impl MockOneTimeTokenRepository {
    pub fn new(users: MockUserRepository) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            users,
        }
    }

    /// Overwrite a stored token, used to simulate expiry
    pub async fn put(&self, token: OneTimeToken) {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token);
    }

    /// Snapshot of all stored tokens
    pub async fn all(&self) -> Vec<OneTimeToken> {
        self.tokens.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl OneTimeTokenRepository for MockOneTimeTokenRepository {
    async fn replace(&self, token: OneTimeToken) -> Result<OneTimeToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        tokens.retain(|_, t| !(t.user_id == token.user_id && t.kind == token.kind && !t.is_used()));
        tokens.insert(token.token_hash.clone(), token.clone());

        Ok(token)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
        kind: TokenKind,
    ) -> Result<Option<OneTimeToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .get(token_hash)
            .filter(|t| t.kind == kind)
            .cloned())
    }

    async fn consume(
        &self,
        token_hash: &str,
        kind: TokenKind,
        effect: TokenEffect,
    ) -> Result<ConsumeOutcome, DomainError> {
        let mut tokens = self.tokens.write().await;

        let token = match tokens.get_mut(token_hash) {
            Some(token) if token.kind == kind && !token.is_used() => token,
            _ => return Ok(ConsumeOutcome::NotFound),
        };

        if token.is_expired() {
            return Ok(ConsumeOutcome::Expired);
        }

        let mut user = match self.users.find_by_id(token.user_id).await? {
            Some(user) => user,
            None => return Ok(ConsumeOutcome::NotFound),
        };

        match effect {
            TokenEffect::SetPassword { password_hash } => user.set_password_hash(password_hash),
            TokenEffect::MarkEmailVerified => user.mark_email_verified(),
        }
        self.users.update(user).await?;
        token.mark_used();

        Ok(ConsumeOutcome::Consumed {
            user_id: token.user_id,
        })
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_used() && !t.is_expired());
        Ok(before - tokens.len())
    }
}
