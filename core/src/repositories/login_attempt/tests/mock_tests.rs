//! Unit tests for mock login attempt repository

use chrono::{Duration, Utc};

use crate::domain::entities::login_attempt::LoginAttempt;
use crate::repositories::login_attempt::{LoginAttemptRepository, MockLoginAttemptRepository};

fn failure(email: &str, ip: &str) -> LoginAttempt {
    LoginAttempt::new(email.to_string(), Some(ip.to_string()), None, false)
}

#[tokio::test]
async fn test_counts_only_failures_inside_window() {
    let repo = MockLoginAttemptRepository::new();
    let since = Utc::now() - Duration::minutes(15);

    let mut old = failure("a@example.com", "1.1.1.1");
    old.attempted_at = Utc::now() - Duration::minutes(30);
    repo.record(old).await.unwrap();
    repo.record(failure("a@example.com", "1.1.1.1")).await.unwrap();
    repo.record(failure("a@example.com", "2.2.2.2")).await.unwrap();
    repo.record(LoginAttempt::new("a@example.com".into(), Some("1.1.1.1".into()), None, true))
        .await
        .unwrap();

    let by_email = repo.failures_by_email("a@example.com", since).await.unwrap();
    assert_eq!(by_email.count, 2);
    assert!(by_email.oldest.is_some());

    let by_ip = repo.failures_by_ip("1.1.1.1", since).await.unwrap();
    assert_eq!(by_ip.count, 1);
}

#[tokio::test]
async fn test_clear_failures_keeps_successes_and_other_emails() {
    let repo = MockLoginAttemptRepository::new();
    repo.record(failure("a@example.com", "1.1.1.1")).await.unwrap();
    repo.record(failure("b@example.com", "1.1.1.1")).await.unwrap();
    repo.record(LoginAttempt::new("a@example.com".into(), None, None, true))
        .await
        .unwrap();

    assert_eq!(repo.clear_failures("a@example.com").await.unwrap(), 1);
    assert_eq!(repo.all().await.len(), 2);
}

#[tokio::test]
async fn test_delete_older_than() {
    let repo = MockLoginAttemptRepository::new();
    let mut stale = failure("a@example.com", "1.1.1.1");
    stale.attempted_at = Utc::now() - Duration::hours(25);
    repo.record(stale).await.unwrap();
    repo.record(failure("a@example.com", "1.1.1.1")).await.unwrap();

    let removed = repo
        .delete_older_than(Utc::now() - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(removed, 1);
}
