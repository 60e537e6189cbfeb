//! Repository tests against a live MySQL instance
//!
//! Run with `DATABASE_URL=... cargo test -- --ignored`.

use chrono::{Duration, Utc};
use uuid::Uuid;

use sm_core::domain::entities::{
    ConsumeOutcome, LoginAttempt, OneTimeToken, RefreshToken, RotateOutcome, TokenEffect,
    TokenKind, User,
};
use sm_core::domain::value_objects::RequestContext;
use sm_core::errors::{AuthError, DomainError};
use sm_core::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};

use super::connection_tests::test_config;
use crate::database::{
    DatabasePool, MySqlLoginAttemptRepository, MySqlOneTimeTokenRepository,
    MySqlSessionRepository, MySqlUserRepository,
};

async fn pool() -> DatabasePool {
    let pool = DatabasePool::new(test_config()).await.unwrap();
    pool.run_migrations().await.unwrap();
    pool
}

fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4().simple())
}

fn unique_hash() -> String {
    format!("{:0>64}", Uuid::new_v4().simple())
}

async fn stored_user(pool: &DatabasePool) -> User {
    let users = MySqlUserRepository::new(pool.get_pool().clone());
    users
        .create(User::new_local(
            unique_email(),
            "$2b$04$placeholderplaceholderplaceholderplaceholderplace".to_string(),
            "Test".to_string(),
        ))
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_duplicate_email_is_rejected() {
    let pool = pool().await;
    let users = MySqlUserRepository::new(pool.get_pool().clone());
    let user = stored_user(&pool).await;

    let duplicate = User::new_local(user.email.clone(), "x".to_string(), "Other".to_string());
    let result = users.create(duplicate).await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UserAlreadyExists))
    ));
    assert!(users.exists_by_email(&user.email).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_update_missing_user_is_not_found() {
    let pool = pool().await;
    let users = MySqlUserRepository::new(pool.get_pool().clone());

    let ghost = User::new_local(unique_email(), "x".to_string(), "Ghost".to_string());
    let result = users.update(ghost).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_concurrent_rotation_has_one_winner() {
    let pool = pool().await;
    let user = stored_user(&pool).await;
    let sessions = std::sync::Arc::new(MySqlSessionRepository::new(pool.get_pool().clone()));
    let context = RequestContext::default();

    let old_hash = unique_hash();
    sessions
        .create(RefreshToken::new(
            user.id,
            old_hash.clone(),
            false,
            Duration::days(1),
            &context,
        ))
        .await
        .unwrap();

    let first = {
        let sessions = sessions.clone();
        let old_hash = old_hash.clone();
        tokio::spawn(async move {
            sessions
                .rotate(&old_hash, unique_hash(), &RequestContext::default())
                .await
        })
    };
    let second = {
        let sessions = sessions.clone();
        let old_hash = old_hash.clone();
        tokio::spawn(async move {
            sessions
                .rotate(&old_hash, unique_hash(), &RequestContext::default())
                .await
        })
    };

    let outcomes = [first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];
    let rotated = outcomes
        .iter()
        .filter(|o| matches!(o, RotateOutcome::Rotated { .. }))
        .count();

    assert_eq!(rotated, 1);
    assert_eq!(sessions.count_for_user(user.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_rotating_expired_session_deletes_it() {
    let pool = pool().await;
    let user = stored_user(&pool).await;
    let sessions = MySqlSessionRepository::new(pool.get_pool().clone());

    let mut token = RefreshToken::new(
        user.id,
        unique_hash(),
        false,
        Duration::days(1),
        &RequestContext::default(),
    );
    token.expires_at = Utc::now() - Duration::minutes(1);
    let hash = token.token_hash.clone();
    sessions.create(token).await.unwrap();

    let outcome = sessions
        .rotate(&hash, unique_hash(), &RequestContext::default())
        .await
        .unwrap();

    assert_eq!(outcome, RotateOutcome::Expired);
    assert!(sessions.find_by_hash(&hash).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_failure_counts_ignore_successes() {
    let pool = pool().await;
    let attempts = MySqlLoginAttemptRepository::new(pool.get_pool().clone());
    let email = unique_email();
    let since = Utc::now() - Duration::minutes(15);

    for success in [false, false, true] {
        attempts
            .record(LoginAttempt::new(
                email.clone(),
                Some("192.0.2.10".to_string()),
                None,
                success,
            ))
            .await
            .unwrap();
    }

    let stats = attempts.failures_by_email(&email, since).await.unwrap();
    assert_eq!(stats.count, 2);
    assert!(stats.oldest.is_some());

    assert_eq!(attempts.clear_failures(&email).await.unwrap(), 2);
    let stats = attempts.failures_by_email(&email, since).await.unwrap();
    assert_eq!(stats.count, 0);
    assert!(stats.oldest.is_none());
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_consume_applies_effect_once() {
    let pool = pool().await;
    let user = stored_user(&pool).await;
    let users = MySqlUserRepository::new(pool.get_pool().clone());
    let tokens = MySqlOneTimeTokenRepository::new(pool.get_pool().clone());

    let hash = unique_hash();
    tokens
        .replace(OneTimeToken::new(
            user.id,
            hash.clone(),
            TokenKind::EmailVerification,
            Duration::hours(24),
        ))
        .await
        .unwrap();

    let first = tokens
        .consume(&hash, TokenKind::EmailVerification, TokenEffect::MarkEmailVerified)
        .await
        .unwrap();
    let second = tokens
        .consume(&hash, TokenKind::EmailVerification, TokenEffect::MarkEmailVerified)
        .await
        .unwrap();

    assert_eq!(first, ConsumeOutcome::Consumed { user_id: user.id });
    assert_eq!(second, ConsumeOutcome::NotFound);
    assert!(users.find_by_id(user.id).await.unwrap().unwrap().email_verified);
}

#[tokio::test]
#[ignore] // Requires actual database
async fn test_replace_removes_unused_token_of_same_kind() {
    let pool = pool().await;
    let user = stored_user(&pool).await;
    let tokens = MySqlOneTimeTokenRepository::new(pool.get_pool().clone());

    let first = unique_hash();
    let second = unique_hash();
    for hash in [&first, &second] {
        tokens
            .replace(OneTimeToken::new(
                user.id,
                hash.clone(),
                TokenKind::PasswordReset,
                Duration::hours(1),
            ))
            .await
            .unwrap();
    }

    assert!(tokens
        .find_by_hash(&first, TokenKind::PasswordReset)
        .await
        .unwrap()
        .is_none());
    assert!(tokens
        .find_by_hash(&second, TokenKind::PasswordReset)
        .await
        .unwrap()
        .is_some());
}
