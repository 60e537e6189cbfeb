//! Single-use tokens for password reset and email verification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose of a one-time token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    PasswordReset,
    EmailVerification,
}

impl TokenKind {
    /// Value stored in the `kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::PasswordReset => "password_reset",
            TokenKind::EmailVerification => "email_verification",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password_reset" => Ok(TokenKind::PasswordReset),
            "email_verification" => Ok(TokenKind::EmailVerification),
            _ => Err(format!("Invalid token kind: {}", s)),
        }
    }
}

/// A stored one-time token; the raw value is never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub kind: TokenKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl OneTimeToken {
    pub fn new(user_id: Uuid, token_hash: String, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            kind,
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn mark_used(&mut self) {
        self.used_at = Some(Utc::now());
    }
}

/// State change applied in the same transaction that consumes a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEffect {
    /// Replace the owner's password hash
    SetPassword { password_hash: String },
    /// Flag the owner's email address as verified
    MarkEmailVerified,
}

/// Result of consuming a one-time token in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Consumed { user_id: Uuid },
    /// Unknown, already used, or of a different kind
    NotFound,
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_column_values() {
        assert_eq!(TokenKind::PasswordReset.as_str(), "password_reset");
        assert_eq!(
            "email_verification".parse::<TokenKind>().unwrap(),
            TokenKind::EmailVerification
        );
        assert!("otp".parse::<TokenKind>().is_err());
    }

    #[test]
    fn test_token_lifecycle() {
        let mut token = OneTimeToken::new(
            Uuid::new_v4(),
            "hash".to_string(),
            TokenKind::PasswordReset,
            Duration::hours(1),
        );
        assert!(!token.is_expired());
        assert!(!token.is_used());

        token.mark_used();
        assert!(token.is_used());

        token.expires_at = Utc::now() - Duration::seconds(1);
        assert!(token.is_expired());
    }
}
