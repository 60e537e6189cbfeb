//! Unit tests for the session store

use std::sync::Arc;

use chrono::{Duration, Utc};
use sm_shared::SessionConfig;
use uuid::Uuid;

use crate::domain::value_objects::RequestContext;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{MockSessionRepository, SessionRepository};
use crate::services::session::SessionStore;

fn store() -> (Arc<MockSessionRepository>, SessionStore<MockSessionRepository>) {
    let repo = Arc::new(MockSessionRepository::new());
    (repo.clone(), SessionStore::new(repo, SessionConfig::default()))
}

#[tokio::test]
async fn test_create_stores_only_hash() {
    let (repo, store) = store();
    let user_id = Uuid::new_v4();

    let issued = store.create(user_id, &RequestContext::default(), false).await.unwrap();

    assert_eq!(issued.token.len(), 64);
    assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(repo.find_by_hash(&issued.token).await.unwrap().is_none());

    let stored = repo.find_by_hash(&store.hash_token(&issued.token)).await.unwrap().unwrap();
    assert_eq!(stored.user_id, user_id);
    assert_eq!(stored.lifetime(), Duration::hours(8));
}

#[tokio::test]
async fn test_remember_selects_long_lifetime() {
    let (_, store) = store();
    let issued = store.create(Uuid::new_v4(), &RequestContext::default(), true).await.unwrap();

    assert_eq!(issued.record.lifetime(), Duration::days(30));
    assert!(issued.expires_in_seconds() > 29 * 24 * 3600);
}

#[tokio::test]
async fn test_hash_is_keyed() {
    let (_, store) = store();
    let other = SessionStore::new(
        Arc::new(MockSessionRepository::new()),
        SessionConfig {
            token_hash_key: "another-key".to_string(),
            ..SessionConfig::default()
        },
    );

    assert_eq!(store.hash_token("abc"), store.hash_token("abc"));
    assert_ne!(store.hash_token("abc"), other.hash_token("abc"));
}

#[tokio::test]
async fn test_rotation_is_single_use() {
    let (_, store) = store();
    let user_id = Uuid::new_v4();
    let t1 = store.create(user_id, &RequestContext::default(), true).await.unwrap();

    let t2 = store.rotate(&t1.token, &RequestContext::default()).await.unwrap();
    assert_eq!(t2.user_id, user_id);
    assert_ne!(t2.token, t1.token);
    assert!(t2.record.remember);

    let replay = store.rotate(&t1.token, &RequestContext::default()).await;
    assert!(matches!(
        replay,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));

    assert!(store.rotate(&t2.token, &RequestContext::default()).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let (_, store) = store();
    let store = Arc::new(store);
    let t1 = store.create(Uuid::new_v4(), &RequestContext::default(), false).await.unwrap();

    let ctx = RequestContext::default();
    let (a, b) = tokio::join!(store.rotate(&t1.token, &ctx), store.rotate(&t1.token, &ctx));

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
}

#[tokio::test]
async fn test_expired_token_is_rejected_and_deleted() {
    let (repo, store) = store();
    let issued = store.create(Uuid::new_v4(), &RequestContext::default(), false).await.unwrap();
    let mut record = issued.record.clone();
    record.expires_at = Utc::now() - Duration::seconds(1);
    repo.put(record).await;

    let result = store.rotate(&issued.token, &RequestContext::default()).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshTokenExpired))
    ));
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_revoke_and_revoke_all() {
    let (repo, store) = store();
    let user_id = Uuid::new_v4();
    let a = store.create(user_id, &RequestContext::default(), false).await.unwrap();
    store.create(user_id, &RequestContext::default(), false).await.unwrap();
    store.create(Uuid::new_v4(), &RequestContext::default(), false).await.unwrap();

    assert!(store.revoke(&a.token).await.unwrap());
    assert!(!store.revoke(&a.token).await.unwrap());
    assert_eq!(store.revoke_all(user_id).await.unwrap(), 1);
    assert_eq!(repo.len().await, 1);
}
