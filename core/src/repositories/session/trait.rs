//! Session repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RotateOutcome};
use crate::domain::value_objects::RequestContext;
use crate::errors::DomainError;

/// Repository trait for refresh session persistence operations
///
/// # Security Considerations
/// - Only token hashes are stored, never the raw token
/// - A session is deleted, not flagged, when it is used or revoked
/// - Expired sessions are removed by a periodic sweep
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new refresh session
    ///
    /// # Arguments
    /// * `token` - The RefreshToken entity to persist
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved session
    /// * `Err(DomainError)` - Save failed (e.g., duplicate hash)
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a session by its token hash
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Session found, possibly expired
    /// * `Ok(None)` - No session with this hash
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find all sessions of a user
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Atomically replace a session with its successor
    ///
    /// Within a single transaction: lock the row matching `old_hash`, delete
    /// it, and insert `RefreshToken::successor(new_hash, context)`. An expired
    /// row is deleted without a successor.
    ///
    /// # Returns
    /// * `Ok(RotateOutcome::Rotated { .. })` - Old session gone, successor stored
    /// * `Ok(RotateOutcome::NotFound)` - Unknown hash, or lost a concurrent rotation
    /// * `Ok(RotateOutcome::Expired)` - Session had expired and was removed
    /// * `Err(DomainError)` - Database error occurred
    async fn rotate(
        &self,
        old_hash: &str,
        new_hash: String,
        context: &RequestContext,
    ) -> Result<RotateOutcome, DomainError>;

    /// Delete a single session
    ///
    /// # Returns
    /// * `Ok(true)` - Session deleted
    /// * `Ok(false)` - No session with this hash
    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Delete every session of a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions deleted
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Delete sessions past their expiry
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of expired sessions deleted
    async fn delete_expired(&self) -> Result<usize, DomainError>;

    /// Count sessions of a user
    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let sessions = self.find_by_user_id(user_id).await?;
        Ok(sessions.len())
    }
}
