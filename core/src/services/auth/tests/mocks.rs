//! Test harness wiring the authentication service to in-memory stores

use std::sync::Arc;

use sm_shared::{AuthConfig, JwtConfig, PasswordPolicyConfig};

use crate::domain::entities::user::UserProfile;
use crate::domain::value_objects::RequestContext;
use crate::repositories::{
    MockLoginAttemptRepository, MockOneTimeTokenRepository, MockSessionRepository,
    MockUserRepository,
};
use crate::services::auth::AuthService;
use crate::services::external::mock::{
    RecordingEmailSender, StaticCaptchaVerifier, StaticIdentityVerifier,
};
use crate::services::external::EmailTemplate;

pub const PASSWORD: &str = "Str0ng!Pass1";

pub type TestAuthService = AuthService<
    MockUserRepository,
    MockSessionRepository,
    MockLoginAttemptRepository,
    MockOneTimeTokenRepository,
>;

pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt: JwtConfig::new("test-secret-key-that-is-long-enough-for-hs256"),
        password: PasswordPolicyConfig {
            bcrypt_cost: 4,
            ..PasswordPolicyConfig::default()
        },
        ..AuthConfig::default()
    }
}

pub fn context(ip: &str) -> RequestContext {
    RequestContext::new(Some(ip.to_string()), Some("test-agent".to_string()))
}

pub struct Harness {
    pub service: TestAuthService,
    pub users: Arc<MockUserRepository>,
    pub sessions: Arc<MockSessionRepository>,
    pub attempts: Arc<MockLoginAttemptRepository>,
    pub one_time_tokens: Arc<MockOneTimeTokenRepository>,
    pub mailer: RecordingEmailSender,
    pub captcha: Option<StaticCaptchaVerifier>,
    pub identity: StaticIdentityVerifier,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(test_config(), RecordingEmailSender::new(), None)
    }

    pub fn with_config(config: AuthConfig) -> Self {
        Self::build(config, RecordingEmailSender::new(), None)
    }

    pub fn with_captcha(valid_token: &str) -> Self {
        Self::build(
            test_config(),
            RecordingEmailSender::new(),
            Some(StaticCaptchaVerifier::new(valid_token)),
        )
    }

    pub fn with_failing_mailer() -> Self {
        Self::build(test_config(), RecordingEmailSender::failing(), None)
    }

    fn build(
        config: AuthConfig,
        mailer: RecordingEmailSender,
        captcha: Option<StaticCaptchaVerifier>,
    ) -> Self {
        let users = Arc::new(MockUserRepository::new());
        let sessions = Arc::new(MockSessionRepository::new());
        let attempts = Arc::new(MockLoginAttemptRepository::new());
        let one_time_tokens = Arc::new(MockOneTimeTokenRepository::new((*users).clone()));
        let identity = StaticIdentityVerifier::new();

        let mut service = AuthService::new(
            users.clone(),
            sessions.clone(),
            attempts.clone(),
            one_time_tokens.clone(),
            Arc::new(mailer.clone()),
            &config,
        )
        .unwrap()
        .with_identity_verifier(Arc::new(identity.clone()));

        if let Some(captcha) = &captcha {
            service = service.with_captcha_verifier(Arc::new(captcha.clone()));
        }

        Self {
            service,
            users,
            sessions,
            attempts,
            one_time_tokens,
            mailer,
            captcha,
            identity,
        }
    }

    /// Registers an account and confirms its email
    pub async fn register_verified(&self, email: &str) -> UserProfile {
        self.service.register(email, PASSWORD, "Test User").await.unwrap();
        let token = self
            .mailer
            .last_token(EmailTemplate::Verification)
            .await
            .unwrap();
        self.service.verify_email(&token).await.unwrap()
    }
}
