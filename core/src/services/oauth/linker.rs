//! Links a verified provider identity to a local account

use std::sync::Arc;

use sm_shared::validation::{mask_email, normalize_email};
use tracing::{info, warn};

use crate::domain::entities::user::User;
use crate::domain::value_objects::OAuthAssertion;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::UserRepository;

/// Resolves an `OAuthAssertion` to a user, creating one when needed
///
/// Lookup order: provider subject, then email (linking the subject to the
/// existing account), then a new password-less account.
pub struct OAuthLinker<U: UserRepository> {
    users: Arc<U>,
}

impl<U: UserRepository> OAuthLinker<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Finds, links or creates the account for an assertion
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The resolved account
    /// * `Err(DomainError::ValidationErr)` - Subject or email missing
    pub async fn link(&self, assertion: &OAuthAssertion) -> DomainResult<User> {
        assertion.validate()?;

        if let Some(user) = self.users.find_by_oauth_subject(&assertion.subject).await? {
            return Ok(user);
        }

        let email = normalize_email(&assertion.email);
        if let Some(user) = self.users.find_by_email(&email).await? {
            return self.attach(user, assertion).await;
        }

        let user = User::new_oauth(
            email.clone(),
            assertion.subject.clone(),
            assertion.display_name(),
            assertion.picture.clone(),
            assertion.email_verified,
        );

        match self.users.create(user).await {
            Ok(user) => {
                info!(user_id = %user.id, email = %mask_email(&email), "Created account from external identity");
                Ok(user)
            }
            // Lost a race with a concurrent sign-up for the same email
            Err(DomainError::Auth(AuthError::UserAlreadyExists)) => {
                let user = self
                    .users
                    .find_by_email(&email)
                    .await?
                    .ok_or(AuthError::UserAlreadyExists)?;
                self.attach(user, assertion).await
            }
            Err(e) => Err(e),
        }
    }

    /// Links the provider subject to an account matched by email
    ///
    /// Only a provider-verified email may claim an account. A password set
    /// on an account whose email was never verified is dropped: whoever set
    /// it never proved ownership of the address.
    async fn attach(&self, mut user: User, assertion: &OAuthAssertion) -> DomainResult<User> {
        if !assertion.email_verified {
            warn!(user_id = %user.id, "Refusing to link by an unverified provider email");
            return Err(AuthError::InvalidCredentials.into());
        }
        if let Some(existing) = user.oauth_subject.as_deref() {
            if existing != assertion.subject {
                warn!(user_id = %user.id, "Account already linked to another external identity");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        if !user.email_verified {
            if user.password_hash.take().is_some() {
                warn!(user_id = %user.id, "Dropped password of unverified account on external sign-in");
            }
            user.mark_email_verified();
        }
        user.link_oauth(assertion.subject.clone());
        if user.profile_picture.is_none() {
            user.profile_picture = assertion.picture.clone();
        }

        let user = self.users.update(user).await?;
        info!(user_id = %user.id, "Linked external identity to existing account");
        Ok(user)
    }
}
