//! Token entities for access tokens and refresh sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::user::UserRole;
use crate::domain::value_objects::RequestContext;

/// Claims structure for the access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Email address at issue time
    pub email: String,

    /// Role at issue time
    pub role: UserRole,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl AccessClaims {
    /// Creates claims that expire `ttl` from now
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    /// * `email` - The user's email
    /// * `role` - The user's role
    /// * `ttl` - Lifetime of the token
    /// * `issuer` - Value for the `iss` claim
    /// * `audience` - Value for the `aud` claim
    pub fn new(
        user_id: Uuid,
        email: &str,
        role: UserRole,
        ttl: Duration,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the user ID from the claims
    ///
    /// # Returns
    ///
    /// `Ok(Uuid)` if the subject can be parsed as a UUID, `Err` otherwise
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Refresh session stored in the database
///
/// Only the keyed hash of the opaque token is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the session
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Hashed token value
    pub token_hash: String,

    /// Whether the long ("remember me") lifetime applies
    pub remember: bool,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// IP address of the client that obtained the token
    pub ip_address: Option<String>,

    /// User agent of the client that obtained the token
    pub user_agent: Option<String>,
}

impl RefreshToken {
    /// Creates a new refresh session
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    /// * `token_hash` - The hashed token value
    /// * `remember` - Lifetime class of the session
    /// * `ttl` - Lifetime of the session
    /// * `context` - Client metadata of the issuing request
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        remember: bool,
        ttl: Duration,
        context: &RequestContext,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            remember,
            created_at: now,
            expires_at: now + ttl,
            ip_address: context.ip_address.clone(),
            user_agent: context.user_agent.clone(),
        }
    }

    /// Builds the session that replaces this one on rotation
    ///
    /// The successor keeps the owner, the remember flag and the original
    /// lifetime length, starting from now.
    pub fn successor(&self, token_hash: String, context: &RequestContext) -> Self {
        Self::new(
            self.user_id,
            token_hash,
            self.remember,
            self.lifetime(),
            context,
        )
    }

    /// Length of the session's validity period
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.created_at
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Result of an atomic refresh token rotation in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotateOutcome {
    /// The old session was deleted and its successor inserted
    Rotated {
        previous: RefreshToken,
        current: RefreshToken,
    },
    /// No session matched the hash (unknown, revoked or already rotated)
    NotFound,
    /// The session existed but had expired; it has been deleted
    Expired,
}
