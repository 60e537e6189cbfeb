//! MySQL implementation of the OneTimeTokenRepository trait.
//!
//! Consuming a token and applying its effect to `users` happen in the
//! same transaction, so a token can change the account at most once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use sm_core::domain::entities::{ConsumeOutcome, OneTimeToken, TokenEffect, TokenKind};
use sm_core::errors::DomainError;
use sm_core::repositories::OneTimeTokenRepository;

use super::{db_error, parse_uuid};

const TOKEN_COLUMNS: &str = "id, user_id, token_hash, kind, created_at, expires_at, used_at";

/// MySQL implementation of OneTimeTokenRepository
pub struct MySqlOneTimeTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlOneTimeTokenRepository {
    /// Create a new MySQL one-time token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<OneTimeToken, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("Failed to get id"))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(db_error("Failed to get user_id"))?;
        let kind: String = row.try_get("kind").map_err(db_error("Failed to get kind"))?;

        Ok(OneTimeToken {
            id: parse_uuid(&id, "one_time_tokens.id")?,
            user_id: parse_uuid(&user_id, "one_time_tokens.user_id")?,
            token_hash: row
                .try_get("token_hash")
                .map_err(db_error("Failed to get token_hash"))?,
            kind: kind.parse::<TokenKind>().map_err(|_| DomainError::Internal {
                message: format!("Unknown one-time token kind: {}", kind),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("Failed to get created_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(db_error("Failed to get expires_at"))?,
            used_at: row
                .try_get("used_at")
                .map_err(db_error("Failed to get used_at"))?,
        })
    }
}

#[async_trait]
impl OneTimeTokenRepository for MySqlOneTimeTokenRepository {
    async fn replace(&self, token: OneTimeToken) -> Result<OneTimeToken, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("DELETE FROM one_time_tokens WHERE user_id = ? AND kind = ? AND used_at IS NULL")
            .bind(token.user_id.to_string())
            .bind(token.kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete previous tokens"))?;

        let query = r#"
            INSERT INTO one_time_tokens (
                id, user_id, token_hash, kind, created_at, expires_at, used_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;
        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.kind.as_str())
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.used_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to save one-time token"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok(token)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
        kind: TokenKind,
    ) -> Result<Option<OneTimeToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM one_time_tokens WHERE token_hash = ? AND kind = ? LIMIT 1",
            TOKEN_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find one-time token"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn consume(
        &self,
        token_hash: &str,
        kind: TokenKind,
        effect: TokenEffect,
    ) -> Result<ConsumeOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let query = format!(
            "SELECT {} FROM one_time_tokens \
             WHERE token_hash = ? AND kind = ? AND used_at IS NULL FOR UPDATE",
            TOKEN_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(token_hash)
            .bind(kind.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock one-time token"))?;

        let token = match row {
            Some(row) => Self::row_to_token(&row)?,
            None => {
                tx.rollback()
                    .await
                    .map_err(db_error("Failed to roll back transaction"))?;
                return Ok(ConsumeOutcome::NotFound);
            }
        };

        if token.is_expired() {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back transaction"))?;
            return Ok(ConsumeOutcome::Expired);
        }

        let now = Utc::now();
        let applied = match &effect {
            TokenEffect::SetPassword { password_hash } => {
                sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                    .bind(password_hash)
                    .bind(now)
                    .bind(token.user_id.to_string())
                    .execute(&mut *tx)
                    .await
            }
            TokenEffect::MarkEmailVerified => {
                sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = ? WHERE id = ?")
                    .bind(now)
                    .bind(token.user_id.to_string())
                    .execute(&mut *tx)
                    .await
            }
        }
        .map_err(db_error("Failed to apply one-time token effect"))?;

        // The owning account is gone; treat the token as unknown
        if applied.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back transaction"))?;
            return Ok(ConsumeOutcome::NotFound);
        }

        sqlx::query("UPDATE one_time_tokens SET used_at = ? WHERE id = ?")
            .bind(now)
            .bind(token.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to mark one-time token used"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok(ConsumeOutcome::Consumed {
            user_id: token.user_id,
        })
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let result =
            sqlx::query("DELETE FROM one_time_tokens WHERE expires_at <= ? OR used_at IS NOT NULL")
                .bind(Utc::now())
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to delete expired one-time tokens"))?;

        Ok(result.rows_affected() as usize)
    }
}
