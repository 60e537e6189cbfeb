//! Login attempt repository trait for brute-force accounting.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::login_attempt::LoginAttempt;
use crate::errors::DomainError;

/// Aggregate of failed attempts for one key inside a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureStats {
    /// Number of failed attempts since the window start
    pub count: u32,
    /// Timestamp of the oldest counted failure
    pub oldest: Option<DateTime<Utc>>,
}

/// Repository trait for LoginAttempt persistence
///
/// Rows are append-only; they are removed by `clear_failures` after a
/// successful login and by the retention sweep.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync {
    /// Append an attempt
    async fn record(&self, attempt: LoginAttempt) -> Result<(), DomainError>;

    /// Count failures for an email since `since`
    ///
    /// # Arguments
    /// * `email` - Normalised email
    /// * `since` - Start of the trailing window
    async fn failures_by_email(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError>;

    /// Count failures from an IP address since `since`
    async fn failures_by_ip(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError>;

    /// Delete failed attempts for an email
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn clear_failures(&self, email: &str) -> Result<usize, DomainError>;

    /// Delete attempts older than `cutoff`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
