//! Mock implementation of LoginAttemptRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::login_attempt::LoginAttempt;
use crate::errors::DomainError;

use super::trait_::{FailureStats, LoginAttemptRepository};

/// Mock login attempt repository backed by a vector
#[derive(Clone, Default)]
pub struct MockLoginAttemptRepository {
    attempts: Arc<Mutex<Vec<LoginAttempt>>>,
}

impl MockLoginAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored attempts
    pub async fn all(&self) -> Vec<LoginAttempt> {
        self.attempts.lock().await.clone()
    }

    fn stats<'a>(attempts: impl Iterator<Item = &'a LoginAttempt>) -> FailureStats {
        attempts.fold(FailureStats::default(), |mut stats, attempt| {
            stats.count += 1;
            stats.oldest = Some(match stats.oldest {
                Some(oldest) if oldest <= attempt.attempted_at => oldest,
                _ => attempt.attempted_at,
            });
            stats
        })
    }
}

#[async_trait]
impl LoginAttemptRepository for MockLoginAttemptRepository {
    async fn record(&self, attempt: LoginAttempt) -> Result<(), DomainError> {
        self.attempts.lock().await.push(attempt);
        Ok(())
    }

    async fn failures_by_email(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError> {
        let attempts = self.attempts.lock().await;
        Ok(Self::stats(attempts.iter().filter(|a| {
            a.is_failure() && a.email == email && a.attempted_at >= since
        })))
    }

    async fn failures_by_ip(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<FailureStats, DomainError> {
        let attempts = self.attempts.lock().await;
        Ok(Self::stats(attempts.iter().filter(|a| {
            a.is_failure()
                && a.ip_address.as_deref() == Some(ip_address)
                && a.attempted_at >= since
        })))
    }

    async fn clear_failures(&self, email: &str) -> Result<usize, DomainError> {
        let mut attempts = self.attempts.lock().await;
        let before = attempts.len();
        attempts.retain(|a| !(a.is_failure() && a.email == email));
        Ok(before - attempts.len())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut attempts = self.attempts.lock().await;
        let before = attempts.len();
        attempts.retain(|a| a.attempted_at >= cutoff);
        Ok(before - attempts.len())
    }
}
