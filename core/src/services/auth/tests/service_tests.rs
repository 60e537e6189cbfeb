//! Unit tests for the authentication service

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::mocks::{context, test_config, Harness, PASSWORD};
use crate::domain::entities::user::UserRole;
use crate::domain::value_objects::{AuthenticatedUser, OAuthAssertion, RequestContext};
use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::{LoginAttemptRepository, SessionRepository, UserRepository};
use crate::services::auth::AuthServiceConfig;
use crate::services::external::EmailTemplate;
use crate::services::maintenance::MaintenanceService;
use crate::services::session::SessionStore;

#[tokio::test]
async fn test_register_normalises_email_and_sends_verification() {
    let h = Harness::new();

    let profile = h
        .service
        .register("  New.User@Example.COM ", PASSWORD, "  New User ")
        .await
        .unwrap();

    assert_eq!(profile.email, "new.user@example.com");
    assert_eq!(profile.display_name, "New User");
    assert!(!profile.email_verified);
    assert_eq!(profile.role, UserRole::User);

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "new.user@example.com");
    assert_eq!(sent[0].template, EmailTemplate::Verification);
    assert!(sent[0].token.is_some());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let h = Harness::new();

    let bad_email = h.service.register("not-an-email", PASSWORD, "Name").await;
    assert!(matches!(
        bad_email,
        Err(DomainError::ValidationErr(ValidationError::InvalidEmail))
    ));

    let blank_name = h.service.register("a@example.com", PASSWORD, "   ").await;
    assert!(matches!(
        blank_name,
        Err(DomainError::ValidationErr(ValidationError::RequiredField { .. }))
    ));

    let long_name = "x".repeat(101);
    let too_long = h.service.register("a@example.com", PASSWORD, &long_name).await;
    assert!(matches!(
        too_long,
        Err(DomainError::ValidationErr(ValidationError::TooLong { .. }))
    ));

    let weak = h.service.register("a@example.com", "password", "Name").await;
    assert!(matches!(
        weak,
        Err(DomainError::ValidationErr(ValidationError::WeakPassword { .. }))
    ));

    assert!(h.users.is_empty().await);
}

#[tokio::test]
async fn test_register_succeeds_when_mail_delivery_fails() {
    let h = Harness::with_failing_mailer();

    let result = h.service.register("user@example.com", PASSWORD, "User").await;

    assert!(result.is_ok());
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_login_issues_tokens_and_session() {
    let h = Harness::new();
    let profile = h.register_verified("user@example.com").await;

    let response = h
        .service
        .login("USER@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await
        .unwrap();

    assert_eq!(response.user.id, profile.id);
    assert_eq!(response.expires_in, 3600);
    assert_eq!(response.refresh_expires_in, 8 * 3600);
    assert!(!response.remember);
    assert_eq!(h.sessions.count_for_user(profile.id).await.unwrap(), 1);

    let stored = h.users.find_by_id(profile.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());

    let me = h.service.current_user(&response.access_token).await.unwrap();
    assert_eq!(
        me,
        AuthenticatedUser {
            id: profile.id,
            email: "user@example.com".to_string(),
            role: UserRole::User,
        }
    );
}

#[tokio::test]
async fn test_login_with_remember_uses_long_session() {
    let h = Harness::new();
    h.register_verified("user@example.com").await;

    let response = h
        .service
        .login("user@example.com", PASSWORD, true, None, &context("10.0.0.1"))
        .await
        .unwrap();

    assert!(response.remember);
    assert_eq!(response.refresh_expires_in, 30 * 24 * 3600);
}

#[tokio::test]
async fn test_login_unknown_email_is_generic_failure() {
    let h = Harness::new();

    let result = h
        .service
        .login("ghost@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
    assert_eq!(h.attempts.all().await.len(), 1);
}

#[tokio::test]
async fn test_login_without_verification_requirement() {
    let mut config = test_config();
    config.require_email_verification = false;
    let h = Harness::with_config(config);
    h.service
        .register("user@example.com", PASSWORD, "User")
        .await
        .unwrap();

    let result = h
        .service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unverified_login_is_not_counted_as_failure() {
    let h = Harness::new();
    h.service
        .register("user@example.com", PASSWORD, "User")
        .await
        .unwrap();

    for _ in 0..6 {
        let result = h
            .service
            .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Auth(AuthError::EmailNotVerified))
        ));
    }
    assert!(h.attempts.all().await.is_empty());
}

#[tokio::test]
async fn test_login_upgrades_weak_hash() {
    let h = Harness::new();
    let profile = h.register_verified("user@example.com").await;

    let mut user = h.users.find_by_id(profile.id).await.unwrap().unwrap();
    user.password_hash = Some(bcrypt::hash(PASSWORD, 4).unwrap());
    h.users.update(user).await.unwrap();

    let mut config = test_config();
    config.password.bcrypt_cost = 5;
    let service = crate::services::auth::AuthService::new(
        h.users.clone(),
        h.sessions.clone(),
        h.attempts.clone(),
        h.one_time_tokens.clone(),
        Arc::new(h.mailer.clone()),
        &config,
    )
    .unwrap();

    service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await
        .unwrap();

    let stored = h.users.find_by_id(profile.id).await.unwrap().unwrap();
    assert!(stored.password_hash.unwrap().starts_with("$2b$05$"));
}

#[tokio::test]
async fn test_captcha_required_after_soft_threshold() {
    let h = Harness::with_captcha("human");
    h.register_verified("user@example.com").await;

    for _ in 0..3 {
        let _ = h
            .service
            .login("user@example.com", "Wrong!Pass1", false, None, &context("10.0.0.1"))
            .await;
    }

    let missing = h
        .service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await;
    assert!(matches!(
        missing,
        Err(DomainError::Auth(AuthError::CaptchaRequired))
    ));

    let wrong = h
        .service
        .login("user@example.com", PASSWORD, false, Some("robot"), &context("10.0.0.1"))
        .await;
    assert!(matches!(wrong, Err(DomainError::Auth(AuthError::CaptchaFailed))));

    let ok = h
        .service
        .login("user@example.com", PASSWORD, false, Some("human"), &context("10.0.0.1"))
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn test_supplied_captcha_is_always_verified() {
    let h = Harness::with_captcha("human");
    h.register_verified("user@example.com").await;

    let result = h
        .service
        .login("user@example.com", PASSWORD, false, Some("robot"), &context("10.0.0.1"))
        .await;

    assert!(matches!(result, Err(DomainError::Auth(AuthError::CaptchaFailed))));
    assert_eq!(h.captcha.as_ref().unwrap().calls().await, 1);
}

#[tokio::test]
async fn test_captcha_ignored_without_verifier() {
    let h = Harness::new();
    h.register_verified("user@example.com").await;
    for _ in 0..3 {
        let _ = h
            .service
            .login("user@example.com", "Wrong!Pass1", false, None, &context("10.0.0.1"))
            .await;
    }

    let result = h
        .service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_refresh_rotates_and_keeps_remember() {
    let h = Harness::new();
    h.register_verified("user@example.com").await;
    let login = h
        .service
        .login("user@example.com", PASSWORD, true, None, &context("10.0.0.1"))
        .await
        .unwrap();

    let refreshed = h
        .service
        .refresh(&login.refresh_token, &context("10.0.0.2"))
        .await
        .unwrap();

    assert_ne!(refreshed.refresh_token, login.refresh_token);
    assert!(refreshed.remember);
    assert_eq!(refreshed.refresh_expires_in, 30 * 24 * 3600);
    assert!(h.service.current_user(&refreshed.access_token).await.is_ok());
    assert_eq!(h.sessions.len().await, 1);
}

#[tokio::test]
async fn test_refresh_for_missing_user_is_invalid() {
    let h = Harness::new();
    let store = SessionStore::new(h.sessions.clone(), test_config().session);
    let orphan = store
        .create(uuid::Uuid::new_v4(), &RequestContext::default(), false)
        .await
        .unwrap();

    let result = h.service.refresh(&orphan.token, &RequestContext::default()).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
    assert!(h.sessions.is_empty().await);

    let empty = h.service.refresh("", &RequestContext::default()).await;
    assert!(matches!(
        empty,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = Harness::new();
    h.register_verified("user@example.com").await;
    let login = h
        .service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await
        .unwrap();

    h.service.logout(&login.refresh_token).await.unwrap();
    h.service.logout(&login.refresh_token).await.unwrap();
    h.service.logout("never-issued").await.unwrap();

    let result = h
        .service
        .refresh(&login.refresh_token, &RequestContext::default())
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let h = Harness::new();
    let profile = h.register_verified("user@example.com").await;
    for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
        h.service
            .login("user@example.com", PASSWORD, false, None, &context(ip))
            .await
            .unwrap();
    }

    assert_eq!(h.service.logout_all(profile.id).await.unwrap(), 3);
    assert!(h.sessions.is_empty().await);
}

#[tokio::test]
async fn test_current_user_rejects_bad_tokens() {
    let h = Harness::new();

    let garbage = h.service.current_user("garbage").await;
    assert!(matches!(
        garbage,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));

    let expired = h
        .service
        .token_codec()
        .issue(uuid::Uuid::new_v4(), "a@example.com", UserRole::User, Duration::seconds(-1))
        .unwrap();
    let result = h.service.current_user(&expired).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenExpired))
    ));
}

#[tokio::test]
async fn test_reset_password_flow() {
    let h = Harness::new();
    h.register_verified("user@example.com").await;

    h.service.forgot_password("User@Example.com").await.unwrap();
    let token = h
        .mailer
        .last_token(EmailTemplate::PasswordReset)
        .await
        .unwrap();

    let weak = h.service.reset_password(&token, "weak").await;
    assert!(matches!(
        weak,
        Err(DomainError::ValidationErr(ValidationError::WeakPassword { .. }))
    ));

    h.service.reset_password(&token, "N3w!Password").await.unwrap();

    let old = h
        .service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await;
    assert!(matches!(old, Err(DomainError::Auth(AuthError::InvalidCredentials))));
    assert!(h
        .service
        .login("user@example.com", "N3w!Password", false, None, &context("10.0.0.1"))
        .await
        .is_ok());

    let reused = h.service.reset_password(&token, "An0ther!Pass").await;
    assert!(matches!(
        reused,
        Err(DomainError::Token(TokenError::OneTimeTokenNotFound))
    ));
}

#[tokio::test]
async fn test_verify_email_sends_welcome() {
    let h = Harness::new();
    h.service
        .register("user@example.com", PASSWORD, "User")
        .await
        .unwrap();
    let token = h
        .mailer
        .last_token(EmailTemplate::Verification)
        .await
        .unwrap();

    let profile = h.service.verify_email(&token).await.unwrap();

    assert!(profile.email_verified);
    let sent = h.mailer.sent().await;
    assert_eq!(sent.last().unwrap().template, EmailTemplate::Welcome);

    let again = h.service.verify_email(&token).await;
    assert!(matches!(
        again,
        Err(DomainError::Token(TokenError::OneTimeTokenNotFound))
    ));
}

#[tokio::test]
async fn test_resend_verification_replaces_token() {
    let h = Harness::new();
    h.service
        .register("user@example.com", PASSWORD, "User")
        .await
        .unwrap();
    let first = h
        .mailer
        .last_token(EmailTemplate::Verification)
        .await
        .unwrap();

    h.service.resend_verification("user@example.com").await.unwrap();
    let second = h
        .mailer
        .last_token(EmailTemplate::Verification)
        .await
        .unwrap();
    assert_ne!(first, second);

    assert!(h.service.verify_email(&first).await.is_err());
    assert!(h.service.verify_email(&second).await.is_ok());

    // Verified accounts and unknown emails get nothing
    let before = h.mailer.sent().await.len();
    h.service.resend_verification("user@example.com").await.unwrap();
    h.service.resend_verification("ghost@example.com").await.unwrap();
    assert_eq!(h.mailer.sent().await.len(), before);
}

#[tokio::test]
async fn test_oauth_login_links_existing_account() {
    let h = Harness::new();
    let profile = h.register_verified("user@example.com").await;
    h.identity
        .insert(
            "id-token",
            OAuthAssertion {
                subject: "google-1".to_string(),
                email: "USER@example.com".to_string(),
                name: Some("User".to_string()),
                picture: None,
                email_verified: true,
            },
        )
        .await;

    let response = h
        .service
        .oauth_login("id-token", &context("10.0.0.1"))
        .await
        .unwrap();

    assert_eq!(response.user.id, profile.id);
    assert!(!response.remember);
    let stored = h.users.find_by_id(profile.id).await.unwrap().unwrap();
    assert_eq!(stored.oauth_subject.as_deref(), Some("google-1"));
    assert!(stored.has_password());
}

#[tokio::test]
async fn test_oauth_login_does_not_unlock_pre_registered_password() {
    let h = Harness::new();
    h.service
        .register("victim@example.com", PASSWORD, "Someone Else")
        .await
        .unwrap();
    h.identity
        .insert(
            "victim-token",
            OAuthAssertion {
                subject: "google-victim".to_string(),
                email: "victim@example.com".to_string(),
                name: Some("Victim".to_string()),
                picture: None,
                email_verified: true,
            },
        )
        .await;

    h.service
        .oauth_login("victim-token", &context("10.0.0.2"))
        .await
        .unwrap();

    let login = h
        .service
        .login("victim@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await;
    assert!(matches!(
        login,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_oauth_login_records_success_and_clears_failures() {
    let h = Harness::new();
    h.register_verified("user@example.com").await;
    for _ in 0..3 {
        let _ = h
            .service
            .login("user@example.com", "Wr0ng!Pass1", false, None, &context("10.0.0.1"))
            .await;
    }
    h.identity
        .insert(
            "id-token",
            OAuthAssertion {
                subject: "google-1".to_string(),
                email: "user@example.com".to_string(),
                name: None,
                picture: None,
                email_verified: true,
            },
        )
        .await;

    h.service
        .oauth_login("id-token", &context("10.0.0.1"))
        .await
        .unwrap();

    let attempts = h.attempts.all().await;
    assert!(attempts.iter().any(|a| a.success && a.email == "user@example.com"));
    assert!(!attempts.iter().any(|a| !a.success && a.email == "user@example.com"));
}

#[tokio::test]
async fn test_oauth_login_rejects_unknown_token() {
    let h = Harness::new();

    let rejected = h.service.oauth_login("forged", &context("10.0.0.1")).await;
    assert!(matches!(
        rejected,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));

    let blank = h.service.oauth_login("  ", &context("10.0.0.1")).await;
    assert!(matches!(
        blank,
        Err(DomainError::ValidationErr(ValidationError::RequiredField { .. }))
    ));
}

#[tokio::test]
async fn test_change_password_revokes_sessions() {
    let h = Harness::new();
    let profile = h.register_verified("user@example.com").await;
    let login = h
        .service
        .login("user@example.com", PASSWORD, false, None, &context("10.0.0.1"))
        .await
        .unwrap();

    let wrong = h
        .service
        .change_password(profile.id, "Wrong!Pass1", "N3w!Password")
        .await;
    assert!(matches!(wrong, Err(DomainError::Auth(AuthError::InvalidCredentials))));

    let weak = h.service.change_password(profile.id, PASSWORD, "weak").await;
    assert!(matches!(
        weak,
        Err(DomainError::ValidationErr(ValidationError::WeakPassword { .. }))
    ));

    h.service
        .change_password(profile.id, PASSWORD, "N3w!Password")
        .await
        .unwrap();

    assert!(h
        .service
        .refresh(&login.refresh_token, &RequestContext::default())
        .await
        .is_err());
    assert!(h
        .service
        .login("user@example.com", "N3w!Password", false, None, &context("10.0.0.1"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_change_password_not_available_without_password() {
    let h = Harness::new();
    h.identity
        .insert(
            "id-token",
            OAuthAssertion {
                subject: "google-2".to_string(),
                email: "oauth@example.com".to_string(),
                name: None,
                picture: None,
                email_verified: true,
            },
        )
        .await;
    let response = h
        .service
        .oauth_login("id-token", &context("10.0.0.1"))
        .await
        .unwrap();

    let result = h
        .service
        .change_password(response.user.id, "", "N3w!Password")
        .await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::InvalidCredentials))));
}

#[tokio::test]
async fn test_role_checks() {
    let h = Harness::new();
    let admin = AuthenticatedUser {
        id: uuid::Uuid::new_v4(),
        email: "admin@example.com".to_string(),
        role: UserRole::Admin,
    };
    let user = AuthenticatedUser {
        role: UserRole::User,
        ..admin.clone()
    };

    assert!(h.service.has_role(&admin, &[UserRole::Admin]));
    assert!(h.service.has_role(&user, &[UserRole::User, UserRole::Admin]));
    assert!(matches!(
        h.service.require_role(&user, &[UserRole::Admin]),
        Err(DomainError::Auth(AuthError::InsufficientPermissions))
    ));
}

#[tokio::test]
async fn test_policy_override() {
    let h = Harness::new();
    let service = h.service.with_config(AuthServiceConfig {
        require_email_verification: false,
        max_name_length: 5,
    });

    let result = service.register("a@example.com", PASSWORD, "Too Long Name").await;
    assert!(matches!(
        result,
        Err(DomainError::ValidationErr(ValidationError::TooLong { .. }))
    ));
    assert!(h.users.is_empty().await);
}

#[tokio::test]
async fn test_maintenance_shares_the_service_stores() {
    let h = Harness::new();
    let mut stale = crate::domain::entities::login_attempt::LoginAttempt::new(
        "a@example.com".to_string(),
        None,
        None,
        false,
    );
    stale.attempted_at = Utc::now() - Duration::days(3);
    h.attempts.record(stale).await.unwrap();

    let maintenance: MaintenanceService<_, _, _> =
        h.service.maintenance(sm_shared::MaintenanceConfig::default());
    let result = maintenance.run_cleanup().await.unwrap();

    assert_eq!(result.stale_attempts_deleted, 1);
}
