//! Authentication results handed to the API layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::token::AccessClaims;
use crate::domain::entities::user::{UserProfile, UserRole};

/// Authentication response containing tokens and user metadata
///
/// Returned by login, OAuth login and refresh. The raw refresh token is
/// meant for the cookie only and is never serialized into a body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed access token for API authentication
    pub access_token: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,

    /// Opaque refresh token
    #[serde(skip_serializing)]
    pub refresh_token: String,

    /// Refresh token expiration time in seconds
    #[serde(skip_serializing)]
    pub refresh_expires_in: i64,

    /// Whether the session uses the long lifetime
    #[serde(skip_serializing)]
    pub remember: bool,

    pub user: UserProfile,
}

impl AuthResponse {
    /// Creates a new authentication response
    ///
    /// # Arguments
    ///
    /// * `access_token` - Signed access token
    /// * `expires_in` - Access token expiration in seconds
    /// * `refresh_token` - Raw refresh token
    /// * `refresh_expires_in` - Refresh token expiration in seconds
    /// * `remember` - Lifetime class of the session
    /// * `user` - Public projection of the authenticated user
    pub fn new(
        access_token: String,
        expires_in: i64,
        refresh_token: String,
        refresh_expires_in: i64,
        remember: bool,
        user: UserProfile,
    ) -> Self {
        Self {
            access_token,
            expires_in,
            refresh_token,
            refresh_expires_in,
            remember,
            user,
        }
    }
}

/// Identity resolved from a verified access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}

impl TryFrom<AccessClaims> for AuthenticatedUser {
    type Error = uuid::Error;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}
