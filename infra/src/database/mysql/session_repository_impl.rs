//! MySQL implementation of the SessionRepository trait.
//!
//! Refresh sessions are stored by token hash only. Rotation locks the
//! old row with `SELECT ... FOR UPDATE`, so of two concurrent rotations
//! of the same token exactly one finds the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sm_core::domain::entities::token::{RefreshToken, RotateOutcome};
use sm_core::domain::value_objects::RequestContext;
use sm_core::errors::DomainError;
use sm_core::repositories::SessionRepository;

use super::{db_error, is_unique_violation, parse_uuid};

const SESSION_COLUMNS: &str =
    "id, user_id, token_hash, remember, created_at, expires_at, ip_address, user_agent";

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    /// Create a new MySQL session repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(db_error("Failed to get user_id"))?;

        Ok(RefreshToken {
            id: parse_uuid(&id, "refresh_tokens.id")?,
            user_id: parse_uuid(&user_id, "refresh_tokens.user_id")?,
            token_hash: row
                .try_get("token_hash")
                .map_err(db_error("Failed to get token_hash"))?,
            remember: row
                .try_get("remember")
                .map_err(db_error("Failed to get remember"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(db_error("Failed to get expires_at"))?,
            ip_address: row
                .try_get("ip_address")
                .map_err(db_error("Failed to get ip_address"))?,
            user_agent: row
                .try_get("user_agent")
                .map_err(db_error("Failed to get user_agent"))?,
        })
    }

    async fn insert<'e, E>(executor: E, token: &RefreshToken) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::MySql>,
    {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, remember, created_at, expires_at,
                ip_address, user_agent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.remember)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(&token.ip_address)
            .bind(&token.user_agent)
            .execute(executor)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        match Self::insert(&self.pool, &token).await {
            Ok(()) => Ok(token),
            Err(e) if is_unique_violation(&e) => Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            }),
            Err(e) => Err(db_error("Failed to save refresh token")(e)),
        }
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1",
            SESSION_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find refresh token"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE user_id = ? ORDER BY created_at DESC",
            SESSION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to find user sessions"))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn rotate(
        &self,
        old_hash: &str,
        new_hash: String,
        context: &RequestContext,
    ) -> Result<RotateOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? FOR UPDATE",
            SESSION_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(old_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock refresh token"))?;

        let previous = match row {
            Some(row) => Self::row_to_token(&row)?,
            None => {
                tx.rollback()
                    .await
                    .map_err(db_error("Failed to roll back transaction"))?;
                return Ok(RotateOutcome::NotFound);
            }
        };

        sqlx::query("DELETE FROM refresh_tokens WHERE id = ?")
            .bind(previous.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete refresh token"))?;

        if previous.is_expired() {
            tx.commit()
                .await
                .map_err(db_error("Failed to commit transaction"))?;
            return Ok(RotateOutcome::Expired);
        }

        let current = previous.successor(new_hash, context);
        Self::insert(&mut *tx, &current)
            .await
            .map_err(db_error("Failed to save rotated refresh token"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok(RotateOutcome::Rotated { previous, current })
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete refresh token"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user sessions"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete expired sessions"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count user sessions"))?;

        let total: i64 = row
            .try_get("total")
            .map_err(db_error("Failed to get session count"))?;
        Ok(total as usize)
    }
}
