//! User entity representing a registered account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// User entity
///
/// `email` is always stored normalised (trimmed, lower-cased). An account
/// without a password hash must carry an OAuth subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Normalised email address, unique
    pub email: String,

    /// bcrypt hash; `None` for accounts that only sign in through OAuth
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Name shown in the UI
    pub display_name: String,

    /// Role used for authorization checks
    pub role: UserRole,

    /// Whether the email address has been confirmed
    pub email_verified: bool,

    /// Provider-scoped subject id of a linked external identity
    pub oauth_subject: Option<String>,

    /// Avatar URL supplied by the identity provider
    pub profile_picture: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates an unverified account with a local password
    pub fn new_local(email: String, password_hash: String, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash: Some(password_hash),
            display_name,
            role: UserRole::User,
            email_verified: false,
            oauth_subject: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Creates a password-less account backed by an external identity
    pub fn new_oauth(
        email: String,
        oauth_subject: String,
        display_name: String,
        profile_picture: Option<String>,
        email_verified: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash: None,
            display_name,
            role: UserRole::User,
            email_verified,
            oauth_subject: Some(oauth_subject),
            profile_picture,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Attaches an external identity to this account
    pub fn link_oauth(&mut self, subject: String) {
        self.oauth_subject = Some(subject);
        self.updated_at = Utc::now();
    }

    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = Some(password_hash);
        self.updated_at = Utc::now();
    }

    pub fn update_last_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Checks whether the user holds one of the given roles
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }

    /// Public projection without credentials
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            email_verified: self.email_verified,
            profile_picture: self.profile_picture.clone(),
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// User data safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}
