//! Mock implementation of SessionRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RotateOutcome};
use crate::domain::value_objects::RequestContext;
use crate::errors::DomainError;

use super::trait_::SessionRepository;

/// Mock session repository keyed by token hash
#[derive(Clone)]
pub struct MockSessionRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MockSessionRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// Overwrite a stored session, used to simulate expiry
    pub async fn put(&self, token: RefreshToken) {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token);
    }
}

impl Default for MockSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        new_hash: String,
        context: &RequestContext,
    ) -> Result<RotateOutcome, DomainError> {
        // The write lock plays the role of the row lock
        let mut tokens = self.tokens.write().await;

        let previous = match tokens.remove(old_hash) {
            Some(token) => token,
            None => return Ok(RotateOutcome::NotFound),
        };

        if previous.is_expired() {
            return Ok(RotateOutcome::Expired);
        }

        let current = previous.successor(new_hash, context);
        tokens.insert(current.token_hash.clone(), current.clone());

        Ok(RotateOutcome::Rotated { previous, current })
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(tokens.remove(token_hash).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.user_id != user_id);

        Ok(initial_count - tokens.len())
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| !token.is_expired());

        Ok(initial_count - tokens.len())
    }
}
