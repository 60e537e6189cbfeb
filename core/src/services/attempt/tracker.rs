//! Sliding-window lockout tracking per email and per IP address

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sm_shared::validation::mask_email;
use sm_shared::LockoutConfig;
use tracing::{debug, warn};

use crate::domain::entities::login_attempt::LoginAttempt;
use crate::domain::value_objects::{LockState, RequestContext};
use crate::errors::DomainResult;
use crate::repositories::{FailureStats, LoginAttemptRepository};

/// Records login attempts and decides whether further attempts are allowed
///
/// Counting always goes against the stored rows; nothing is cached in
/// process, so several server instances see the same state.
pub struct AttemptTracker<R: LoginAttemptRepository> {
    repository: Arc<R>,
    config: LockoutConfig,
}

impl<R: LoginAttemptRepository> AttemptTracker<R> {
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self { repository, config }
    }

    fn window(&self) -> Duration {
        Duration::minutes(self.config.window_minutes)
    }

    /// Appends an attempt for `email` with the caller's metadata
    pub async fn record_attempt(
        &self,
        email: &str,
        context: &RequestContext,
        success: bool,
    ) -> DomainResult<()> {
        let attempt = LoginAttempt::new(
            email.to_string(),
            context.ip_address.clone(),
            context.user_agent.clone(),
            success,
        );
        self.repository.record(attempt).await
    }

    /// Forgets the failures of an email after a successful login
    pub async fn clear_failures(&self, email: &str) -> DomainResult<usize> {
        let cleared = self.repository.clear_failures(email).await?;
        if cleared > 0 {
            debug!(email = %mask_email(email), cleared, "Cleared failed login attempts");
        }
        Ok(cleared)
    }

    /// Computes the lock state for an email and an optional IP address
    ///
    /// # Returns
    ///
    /// * `LockState::locked` - A hard threshold is reached
    /// * `LockState::captcha` - A soft threshold is reached
    /// * `LockState::open` - Otherwise
    pub async fn lock_state(&self, email: &str, ip_address: Option<&str>) -> DomainResult<LockState> {
        let now = Utc::now();
        let since = now - self.window();

        let by_email = self.repository.failures_by_email(email, since).await?;
        let by_ip = match ip_address {
            Some(ip) => self.repository.failures_by_ip(ip, since).await?,
            None => FailureStats::default(),
        };

        let email_locked = by_email.count >= self.config.max_email_failures;
        let ip_locked = by_ip.count >= self.config.max_ip_failures;

        if email_locked || ip_locked {
            let mut retry_after = 0;
            if email_locked {
                retry_after = retry_after.max(self.seconds_until_released(by_email.oldest, now));
            }
            if ip_locked {
                retry_after = retry_after.max(self.seconds_until_released(by_ip.oldest, now));
            }

            warn!(
                email = %mask_email(email),
                email_failures = by_email.count,
                ip_failures = by_ip.count,
                retry_after,
                "Login locked out"
            );
            return Ok(LockState::locked(retry_after));
        }

        if by_email.count >= self.config.captcha_email_failures
            || by_ip.count >= self.config.captcha_ip_failures
        {
            return Ok(LockState::captcha());
        }

        Ok(LockState::open())
    }

    /// Deletes attempts older than the retention period
    pub async fn purge_stale(&self) -> DomainResult<usize> {
        let cutoff = Utc::now() - Duration::minutes(self.config.effective_retention_minutes());
        self.repository.delete_older_than(cutoff).await
    }

    /// Seconds until the oldest counted failure leaves the window
    fn seconds_until_released(&self, oldest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
        let remaining = match oldest {
            Some(oldest) => (oldest + self.window() - now).num_seconds(),
            None => 0,
        };
        remaining.max(1) as u64
    }
}
