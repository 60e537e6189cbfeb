//! Main authentication service implementation

use std::sync::Arc;

use sm_shared::validation::{is_valid_email, mask_email, normalize_email, not_blank};
use sm_shared::{AuthConfig, MaintenanceConfig};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::one_time_token::TokenEffect;
use crate::domain::entities::user::{User, UserProfile, UserRole};
use crate::domain::value_objects::{AuthResponse, AuthenticatedUser, RequestContext};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::{
    LoginAttemptRepository, OneTimeTokenRepository, SessionRepository, UserRepository,
};
use crate::services::attempt::AttemptTracker;
use crate::services::credential::CredentialService;
use crate::services::external::{CaptchaVerifier, EmailSender, EmailTemplate, IdentityVerifier};
use crate::services::maintenance::MaintenanceService;
use crate::services::oauth::OAuthLinker;
use crate::services::one_time::OneTimeTokenFlow;
use crate::services::session::SessionStore;
use crate::services::token::{TokenCodec, TokenCodecConfig};

use super::config::AuthServiceConfig;

/// Authentication facade orchestrating credentials, lockout, tokens and sessions
pub struct AuthService<U, S, L, O>
where
    U: UserRepository,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    /// User repository for account lookups and updates
    user_repository: Arc<U>,
    /// Password hashing and strength checks
    credentials: Arc<CredentialService>,
    /// Failed-login accounting
    attempts: Arc<AttemptTracker<L>>,
    /// Access token signing
    token_codec: Arc<TokenCodec>,
    /// Refresh sessions
    sessions: Arc<SessionStore<S>>,
    password_resets: Arc<OneTimeTokenFlow<O>>,
    email_verifications: Arc<OneTimeTokenFlow<O>>,
    oauth_linker: OAuthLinker<U>,
    email_sender: Arc<dyn EmailSender>,
    /// CAPTCHA checks are skipped entirely when unset
    captcha_verifier: Option<Arc<dyn CaptchaVerifier>>,
    identity_verifier: Option<Arc<dyn IdentityVerifier>>,
    config: AuthServiceConfig,
}

impl<U, S, L, O> AuthService<U, S, L, O>
where
    U: UserRepository,
    S: SessionRepository + 'static,
    L: LoginAttemptRepository + 'static,
    O: OneTimeTokenRepository + 'static,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `session_repository` - Repository for refresh sessions
    /// * `attempt_repository` - Repository for login attempts
    /// * `token_repository` - Repository for reset and verification tokens
    /// * `email_sender` - Delivery of transactional email
    /// * `config` - Authentication configuration
    ///
    /// # Returns
    ///
    /// * `Ok(AuthService)` - Ready to use
    /// * `Err(DomainError)` - The password policy is invalid
    pub fn new(
        user_repository: Arc<U>,
        session_repository: Arc<S>,
        attempt_repository: Arc<L>,
        token_repository: Arc<O>,
        email_sender: Arc<dyn EmailSender>,
        config: &AuthConfig,
    ) -> DomainResult<Self> {
        let credentials = Arc::new(CredentialService::new(config.password.clone())?);
        let attempts = Arc::new(AttemptTracker::new(attempt_repository, config.lockout.clone()));
        let token_codec = Arc::new(TokenCodec::new(TokenCodecConfig::from(&config.jwt)));
        let sessions = Arc::new(SessionStore::new(session_repository, config.session.clone()));
        let password_resets = Arc::new(OneTimeTokenFlow::password_reset(
            token_repository.clone(),
            &config.one_time_tokens,
        ));
        let email_verifications = Arc::new(OneTimeTokenFlow::email_verification(
            token_repository,
            &config.one_time_tokens,
        ));

        Ok(Self {
            oauth_linker: OAuthLinker::new(user_repository.clone()),
            user_repository,
            credentials,
            attempts,
            token_codec,
            sessions,
            password_resets,
            email_verifications,
            email_sender,
            captcha_verifier: None,
            identity_verifier: None,
            config: AuthServiceConfig::from(config),
        })
    }

    /// Enables CAPTCHA verification on login
    pub fn with_captcha_verifier(mut self, verifier: Arc<dyn CaptchaVerifier>) -> Self {
        self.captcha_verifier = Some(verifier);
        self
    }

    /// Enables sign-in with an external identity provider
    pub fn with_identity_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.identity_verifier = Some(verifier);
        self
    }

    /// Overrides the policy switches
    pub fn with_config(mut self, config: AuthServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Codec shared with the request authentication middleware
    pub fn token_codec(&self) -> Arc<TokenCodec> {
        self.token_codec.clone()
    }

    /// Builds the sweeper over the same stores this service writes to
    pub fn maintenance(&self, config: MaintenanceConfig) -> MaintenanceService<S, L, O> {
        MaintenanceService::new(
            self.sessions.clone(),
            self.attempts.clone(),
            self.password_resets.clone(),
            config,
        )
    }

    /// Register a new account with email and password
    ///
    /// The account starts unverified; a verification email is sent, and a
    /// delivery failure is only logged.
    ///
    /// # Returns
    ///
    /// * `Ok(UserProfile)` - The created account
    /// * `Err(DomainError::ValidationErr)` - Malformed email, blank name or weak password
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Email taken
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> DomainResult<UserProfile> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }

        let name = name.trim();
        if !not_blank(name) {
            return Err(ValidationError::RequiredField {
                field: "name".to_string(),
            }
            .into());
        }
        if name.chars().count() > self.config.max_name_length {
            return Err(ValidationError::TooLong {
                field: "name".to_string(),
                max: self.config.max_name_length,
            }
            .into());
        }

        self.credentials.check_strength(password)?;

        if self.user_repository.exists_by_email(&email).await? {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = self.credentials.hash(password)?;
        let user = self
            .user_repository
            .create(User::new_local(email.clone(), password_hash, name.to_string()))
            .await?;

        info!(user_id = %user.id, email = %mask_email(&email), "User registered");

        self.send_verification(&user).await;

        Ok(user.profile())
    }

    /// Authenticate with email and password
    ///
    /// This method:
    /// 1. Rejects locked (email, ip) pairs without checking the password
    /// 2. Verifies a CAPTCHA when a verifier is configured and one is needed or supplied
    /// 3. Verifies the password, recording failures
    /// 4. Enforces email verification when required
    /// 5. Issues an access token and a refresh session
    ///
    /// # Arguments
    ///
    /// * `email` - Email as typed by the user
    /// * `password` - Password as typed by the user
    /// * `remember` - Selects the long session lifetime
    /// * `captcha_token` - CAPTCHA response, if the client sent one
    /// * `context` - Client metadata
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - Tokens and user profile
    /// * `Err(DomainError::Auth(AuthError::AccountLocked { .. }))` - Too many failures
    /// * `Err(DomainError::Auth(AuthError::InvalidCredentials))` - Unknown email or wrong password
    /// * `Err(DomainError::Auth(AuthError::EmailNotVerified))` - Correct password, unverified email
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
        captcha_token: Option<&str>,
        context: &RequestContext,
    ) -> DomainResult<AuthResponse> {
        let email = normalize_email(email);
        if !not_blank(&email) {
            return Err(ValidationError::RequiredField {
                field: "email".to_string(),
            }
            .into());
        }
        if password.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "password".to_string(),
            }
            .into());
        }

        let ip_address = context.ip_address.as_deref();
        let lock = self.attempts.lock_state(&email, ip_address).await?;
        if lock.locked {
            return Err(AuthError::AccountLocked {
                retry_after_seconds: lock.retry_after_seconds,
            }
            .into());
        }

        self.check_captcha(lock.require_captcha, captcha_token, ip_address)
            .await?;

        let user = self.user_repository.find_by_email(&email).await?;
        let password_matches = match user.as_ref().and_then(|u| u.password_hash.as_deref()) {
            Some(hash) => self.credentials.verify(password, hash),
            None => self.credentials.verify_dummy(password),
        };

        let mut user = match user {
            Some(user) if password_matches => user,
            _ => {
                self.attempts.record_attempt(&email, context, false).await?;
                warn!(email = %mask_email(&email), "Failed login attempt");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if self.config.require_email_verification && !user.email_verified {
            debug!(user_id = %user.id, "Login blocked until email is verified");
            return Err(AuthError::EmailNotVerified.into());
        }

        self.attempts.record_attempt(&email, context, true).await?;
        self.attempts.clear_failures(&email).await?;

        if let Some(hash) = user.password_hash.as_deref() {
            if self.credentials.needs_rehash(hash) {
                let rehashed = self.credentials.hash(password)?;
                user.set_password_hash(rehashed);
                debug!(user_id = %user.id, "Password hash upgraded to current cost");
            }
        }

        user.update_last_login();
        let user = self.user_repository.update(user).await?;

        info!(user_id = %user.id, remember, "User logged in");

        self.issue_tokens(&user, context, remember).await
    }

    /// Exchange a refresh token for a new access token and a rotated refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - New token pair, same session lifetime class
    /// * `Err(DomainError::Token(TokenError::InvalidRefreshToken))` - Unknown or reused token
    /// * `Err(DomainError::Token(TokenError::RefreshTokenExpired))` - Session expired
    pub async fn refresh(
        &self,
        refresh_token: &str,
        context: &RequestContext,
    ) -> DomainResult<AuthResponse> {
        if refresh_token.is_empty() {
            return Err(TokenError::InvalidRefreshToken.into());
        }

        let rotation = self.sessions.rotate(refresh_token, context).await?;

        let user = match self.user_repository.find_by_id(rotation.user_id).await? {
            Some(user) => user,
            None => {
                self.sessions.revoke(&rotation.token).await?;
                return Err(TokenError::InvalidRefreshToken.into());
            }
        };

        let access_token =
            self.token_codec
                .issue_default(user.id, &user.email, user.role)?;

        debug!(user_id = %user.id, "Refresh token rotated");

        Ok(AuthResponse::new(
            access_token,
            self.token_codec.access_token_ttl_seconds(),
            rotation.token,
            rotation.record.lifetime().num_seconds(),
            rotation.record.remember,
            user.profile(),
        ))
    }

    /// End the session of a refresh token
    ///
    /// Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        if refresh_token.is_empty() {
            return Ok(());
        }
        if self.sessions.revoke(refresh_token).await? {
            debug!("Refresh session ended");
        }
        Ok(())
    }

    /// End every session of a user
    ///
    /// # Returns
    ///
    /// Number of sessions ended.
    pub async fn logout_all(&self, user_id: Uuid) -> DomainResult<usize> {
        self.sessions.revoke_all(user_id).await
    }

    /// Resolve the caller of an access token without touching the datastore
    ///
    /// # Returns
    ///
    /// * `Ok(AuthenticatedUser)` - Id, email and role from the token
    /// * `Err(DomainError::Token(TokenError::TokenExpired))` - Token expired
    /// * `Err(DomainError::Token(_))` - Token invalid
    pub async fn current_user(&self, access_token: &str) -> DomainResult<AuthenticatedUser> {
        let claims = self.token_codec.verify(access_token)?;
        AuthenticatedUser::try_from(claims).map_err(|_| {
            TokenError::MissingClaim {
                claim: "sub".to_string(),
            }
            .into()
        })
    }

    /// Start a password reset
    ///
    /// Always succeeds so that callers cannot probe for registered emails.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<()> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Ok(());
        }

        let user = match self.user_repository.find_by_email(&email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(email = %mask_email(&email), "Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => {
                error!(error = %e, "Password reset lookup failed");
                return Ok(());
            }
        };

        match self.password_resets.issue(user.id).await {
            Ok(token) => {
                self.deliver(&user, EmailTemplate::PasswordReset, Some(&token))
                    .await;
                info!(user_id = %user.id, "Password reset token issued");
            }
            Err(e) => error!(user_id = %user.id, error = %e, "Failed to issue password reset token"),
        }

        Ok(())
    }

    /// Set a new password with a reset token
    ///
    /// On success every session of the user is ended.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Password replaced
    /// * `Err(DomainError::ValidationErr)` - Weak password
    /// * `Err(DomainError::Token(_))` - Unknown, used or expired token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> DomainResult<()> {
        if token.is_empty() {
            return Err(TokenError::OneTimeTokenNotFound.into());
        }
        self.credentials.check_strength(new_password)?;

        let password_hash = self.credentials.hash(new_password)?;
        let user_id = self
            .password_resets
            .consume(token, TokenEffect::SetPassword { password_hash })
            .await?;

        self.sessions.revoke_all(user_id).await?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Confirm an email address with a verification token
    ///
    /// # Returns
    ///
    /// * `Ok(UserProfile)` - The now verified account
    /// * `Err(DomainError::Token(_))` - Unknown, used or expired token
    pub async fn verify_email(&self, token: &str) -> DomainResult<UserProfile> {
        if token.is_empty() {
            return Err(TokenError::OneTimeTokenNotFound.into());
        }

        let user_id = self
            .email_verifications
            .consume(token, TokenEffect::MarkEmailVerified)
            .await?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!(user_id = %user.id, "Email address verified");
        self.deliver(&user, EmailTemplate::Welcome, None).await;

        Ok(user.profile())
    }

    /// Send a fresh verification email to an unverified account
    ///
    /// Always succeeds so that callers cannot probe for registered emails.
    pub async fn resend_verification(&self, email: &str) -> DomainResult<()> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Ok(());
        }

        match self.user_repository.find_by_email(&email).await {
            Ok(Some(user)) if !user.email_verified => self.send_verification(&user).await,
            Ok(_) => debug!(email = %mask_email(&email), "No unverified account for resend"),
            Err(e) => error!(error = %e, "Verification resend lookup failed"),
        }

        Ok(())
    }

    /// Sign in with a provider ID token
    ///
    /// Links or creates the local account, then issues tokens exactly like
    /// a password login (without the long session lifetime).
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - Tokens and user profile
    /// * `Err(DomainError::Auth(AuthError::InvalidCredentials))` - Token rejected by the provider
    pub async fn oauth_login(
        &self,
        id_token: &str,
        context: &RequestContext,
    ) -> DomainResult<AuthResponse> {
        if !not_blank(id_token) {
            return Err(ValidationError::RequiredField {
                field: "idToken".to_string(),
            }
            .into());
        }

        let verifier = self
            .identity_verifier
            .as_ref()
            .ok_or_else(|| DomainError::Validation {
                message: "External sign-in is not enabled".to_string(),
            })?;

        let assertion = verifier.verify_id_token(id_token).await?;
        let mut user = self.oauth_linker.link(&assertion).await?;

        self.attempts.record_attempt(&user.email, context, true).await?;
        self.attempts.clear_failures(&user.email).await?;

        user.update_last_login();
        let user = self.user_repository.update(user).await?;

        info!(user_id = %user.id, "User logged in with external identity");

        self.issue_tokens(&user, context, false).await
    }

    /// Replace the password of a signed-in user
    ///
    /// Accounts without a password cannot use this. On success every
    /// session of the user is ended.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Password replaced
    /// * `Err(DomainError::Auth(AuthError::InvalidCredentials))` - Current password wrong
    /// * `Err(DomainError::ValidationErr)` - Weak new password
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let mut user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = match user.password_hash.as_deref() {
            Some(hash) => self.credentials.verify(current_password, hash),
            None => self.credentials.verify_dummy(current_password),
        };
        if !matches {
            warn!(user_id = %user.id, "Password change with wrong current password");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.credentials.check_strength(new_password)?;
        user.set_password_hash(self.credentials.hash(new_password)?);
        self.user_repository.update(user).await?;

        self.sessions.revoke_all(user_id).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Check whether a user holds one of the given roles
    pub fn has_role(&self, user: &AuthenticatedUser, roles: &[UserRole]) -> bool {
        user.has_role(roles)
    }

    /// Like `has_role`, failing with `InsufficientPermissions`
    pub fn require_role(&self, user: &AuthenticatedUser, roles: &[UserRole]) -> DomainResult<()> {
        if self.has_role(user, roles) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions.into())
        }
    }

    /// Validates the CAPTCHA requirement of a login attempt
    async fn check_captcha(
        &self,
        required: bool,
        captcha_token: Option<&str>,
        remote_ip: Option<&str>,
    ) -> DomainResult<()> {
        let verifier = match &self.captcha_verifier {
            Some(verifier) => verifier,
            None => return Ok(()),
        };

        match captcha_token.filter(|t| !t.is_empty()) {
            Some(token) => match verifier.verify(token, remote_ip).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(AuthError::CaptchaFailed.into()),
                Err(e) => {
                    error!(error = %e, "CAPTCHA verification unavailable");
                    Err(AuthError::CaptchaFailed.into())
                }
            },
            None if required => Err(AuthError::CaptchaRequired.into()),
            None => Ok(()),
        }
    }

    async fn issue_tokens(
        &self,
        user: &User,
        context: &RequestContext,
        remember: bool,
    ) -> DomainResult<AuthResponse> {
        let access_token = self
            .token_codec
            .issue_default(user.id, &user.email, user.role)?;
        let session = self.sessions.create(user.id, context, remember).await?;

        Ok(AuthResponse::new(
            access_token,
            self.token_codec.access_token_ttl_seconds(),
            session.token,
            self.sessions.ttl_seconds(remember),
            remember,
            user.profile(),
        ))
    }

    async fn send_verification(&self, user: &User) {
        match self.email_verifications.issue(user.id).await {
            Ok(token) => {
                self.deliver(user, EmailTemplate::Verification, Some(&token))
                    .await
            }
            Err(e) => error!(user_id = %user.id, error = %e, "Failed to issue verification token"),
        }
    }

    /// Sends an email, logging instead of failing
    async fn deliver(&self, user: &User, template: EmailTemplate, token: Option<&str>) {
        if let Err(e) = self
            .email_sender
            .send(&user.email, template, token, &user.display_name)
            .await
        {
            error!(
                user_id = %user.id,
                template = template.as_str(),
                error = %e,
                "Failed to send email"
            );
        }
    }
}
