use serde::{Deserialize, Serialize};
use validator::Validate;

use sm_core::domain::entities::UserProfile;
use sm_core::domain::value_objects::{AuthResponse, AuthenticatedUser};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    /// Long-lived session when set
    #[serde(default)]
    pub remember: bool,

    #[serde(default)]
    pub captcha_token: Option<String>,
}

/// Body carrying only an email address (forgot-password, resend-verification)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 256))]
    pub token: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, max = 256))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    #[validate(length(min = 1, max = 4096))]
    pub id_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 128))]
    pub current_password: String,

    #[validate(length(min = 1, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Body of a successful refresh; the new refresh token goes in the cookie
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

impl From<&AuthResponse> for RefreshResponse {
    fn from(response: &AuthResponse) -> Self {
        Self {
            access_token: response.access_token.clone(),
            expires_in: response.expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub user: AuthenticatedUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
