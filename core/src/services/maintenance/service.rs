//! Maintenance service sweeping expired sessions, stale attempts and used tokens
//!
//! Every sweep is an idempotent delete, so it can run next to live traffic
//! and on several instances at once.

use std::sync::Arc;

use sm_shared::MaintenanceConfig;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::{LoginAttemptRepository, OneTimeTokenRepository, SessionRepository};
use crate::services::attempt::AttemptTracker;
use crate::services::one_time::OneTimeTokenFlow;
use crate::services::session::SessionStore;

/// Service for cleaning up expired authentication records
pub struct MaintenanceService<S, L, O>
where
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    sessions: Arc<SessionStore<S>>,
    attempts: Arc<AttemptTracker<L>>,
    one_time_tokens: Arc<OneTimeTokenFlow<O>>,
    config: MaintenanceConfig,
}

impl<S, L, O> MaintenanceService<S, L, O>
where
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    pub fn new(
        sessions: Arc<SessionStore<S>>,
        attempts: Arc<AttemptTracker<L>>,
        one_time_tokens: Arc<OneTimeTokenFlow<O>>,
        config: MaintenanceConfig,
    ) -> Self {
        Self {
            sessions,
            attempts,
            one_time_tokens,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// A failing sweep does not stop the others; its error is collected in
    /// the result.
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of cleanup operations
    /// * `Err(DomainError)` - Reserved for failures outside the sweeps
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let mut result = CleanupResult::default();

        match self.sessions.sweep_expired().await {
            Ok(count) => result.expired_sessions_deleted = count,
            Err(e) => {
                error!("Failed to delete expired sessions: {}", e);
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        match self.attempts.purge_stale().await {
            Ok(count) => result.stale_attempts_deleted = count,
            Err(e) => {
                error!("Failed to purge login attempts: {}", e);
                result.errors.push(format!("Login attempt cleanup error: {}", e));
            }
        }

        match self.one_time_tokens.sweep_expired().await {
            Ok(count) => result.one_time_tokens_deleted = count,
            Err(e) => {
                error!("Failed to delete one-time tokens: {}", e);
                result.errors.push(format!("One-time token cleanup error: {}", e));
            }
        }

        info!(
            sessions = result.expired_sessions_deleted,
            attempts = result.stale_attempts_deleted,
            one_time_tokens = result.one_time_tokens_deleted,
            "Maintenance cycle completed"
        );

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// Spawns a tokio task that runs `run_cleanup` at the configured interval.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Maintenance service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        tokio::spawn(async move {
            info!(
                "Maintenance service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Maintenance cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub expired_sessions_deleted: usize,
    pub stale_attempts_deleted: usize,
    /// Expired or already used reset and verification tokens
    pub one_time_tokens_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of items cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.expired_sessions_deleted + self.stale_attempts_deleted + self.one_time_tokens_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sm_shared::{LockoutConfig, OneTimeTokenConfig, SessionConfig};
    use uuid::Uuid;

    use crate::domain::entities::login_attempt::LoginAttempt;
    use crate::domain::value_objects::RequestContext;
    use crate::repositories::{
        MockLoginAttemptRepository, MockOneTimeTokenRepository, MockSessionRepository,
        MockUserRepository,
    };

    type Service = MaintenanceService<
        MockSessionRepository,
        MockLoginAttemptRepository,
        MockOneTimeTokenRepository,
    >;

    type Fixture = (
        Arc<MockSessionRepository>,
        Arc<MockLoginAttemptRepository>,
        Arc<SessionStore<MockSessionRepository>>,
        Service,
    );

    fn setup(config: MaintenanceConfig) -> Fixture {
        let session_repo = Arc::new(MockSessionRepository::new());
        let attempt_repo = Arc::new(MockLoginAttemptRepository::new());
        let token_repo = Arc::new(MockOneTimeTokenRepository::new(MockUserRepository::new()));

        let sessions = Arc::new(SessionStore::new(session_repo.clone(), SessionConfig::default()));
        let attempts = Arc::new(AttemptTracker::new(attempt_repo.clone(), LockoutConfig::default()));
        let flow = Arc::new(OneTimeTokenFlow::password_reset(token_repo, &OneTimeTokenConfig::default()));

        let service = MaintenanceService::new(sessions.clone(), attempts, flow, config);
        (session_repo, attempt_repo, sessions, service)
    }

    #[tokio::test]
    async fn test_run_cleanup_removes_expired_state() {
        let (session_repo, attempt_repo, sessions, service) = setup(MaintenanceConfig::default());

        let live = sessions.create(Uuid::new_v4(), &RequestContext::default(), false).await.unwrap();
        let expired = sessions.create(Uuid::new_v4(), &RequestContext::default(), false).await.unwrap();
        let mut record = expired.record;
        record.expires_at = Utc::now() - Duration::minutes(1);
        session_repo.put(record).await;

        let mut stale = LoginAttempt::new("a@example.com".into(), None, None, false);
        stale.attempted_at = Utc::now() - Duration::days(2);
        attempt_repo.record(stale).await.unwrap();

        let result = service.run_cleanup().await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.expired_sessions_deleted, 1);
        assert_eq!(result.stale_attempts_deleted, 1);
        assert_eq!(result.total_cleaned(), 2);
        assert_eq!(session_repo.len().await, 1);
        assert!(sessions.rotate(&live.token, &RequestContext::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_service_does_nothing() {
        let (session_repo, _, sessions, service) = setup(MaintenanceConfig {
            enabled: false,
            ..MaintenanceConfig::default()
        });
        let expired = sessions.create(Uuid::new_v4(), &RequestContext::default(), false).await.unwrap();
        let mut record = expired.record;
        record.expires_at = Utc::now() - Duration::minutes(1);
        session_repo.put(record).await;

        let result = service.run_cleanup().await.unwrap();
        assert_eq!(result.total_cleaned(), 0);
        assert_eq!(session_repo.len().await, 1);
    }
}
