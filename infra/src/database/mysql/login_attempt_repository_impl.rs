//! MySQL implementation of the LoginAttemptRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use sm_core::domain::entities::LoginAttempt;
use sm_core::errors::DomainError;
use sm_core::repositories::{FailureStats, LoginAttemptRepository};

use super::db_error;

/// MySQL implementation of LoginAttemptRepository
///
/// Failure counts are computed with `COUNT(*)` and `MIN(attempted_at)` over
/// the `(email, attempted_at)` and `(ip_address, attempted_at)` indexes.
pub struct MySqlLoginAttemptRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlLoginAttemptRepository {
    /// Create a new MySQL login attempt repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_stats(row: &sqlx::mysql::MySqlRow) -> Result<FailureStats, DomainError> {
        let count: i64 = row
            .try_get("failures")
            .map_err(db_error("Failed to get failure count"))?;
        let oldest: Option<DateTime<Utc>> = row
            .try_get("oldest")
            .map_err(db_error("Failed to get oldest failure"))?;

        Ok(FailureStats {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            oldest,
        })
    }

    async fn failures_by(
        &self,
        column: &str,
        value: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError> {
        let query = format!(
            "SELECT COUNT(*) AS failures, MIN(attempted_at) AS oldest \
             FROM login_attempts \
             WHERE {} = ? AND success = FALSE AND attempted_at >= ?",
            column
        );

        let row = sqlx::query(&query)
            .bind(value)
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count login failures"))?;

        Self::row_to_stats(&row)
    }
}

#[async_trait]
impl LoginAttemptRepository for MySqlLoginAttemptRepository {
    async fn record(&self, attempt: LoginAttempt) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO login_attempts (
                id, email, ip_address, user_agent, success, attempted_at
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(attempt.id.to_string())
            .bind(&attempt.email)
            .bind(&attempt.ip_address)
            .bind(&attempt.user_agent)
            .bind(attempt.success)
            .bind(attempt.attempted_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to record login attempt"))?;

        Ok(())
    }

    async fn failures_by_email(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError> {
        self.failures_by("email", email, since).await
    }

    async fn failures_by_ip(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError> {
        self.failures_by("ip_address", ip_address, since).await
    }

    async fn clear_failures(&self, email: &str) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE email = ? AND success = FALSE")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to clear login failures"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete old login attempts"))?;

        Ok(result.rows_affected() as usize)
    }
}
