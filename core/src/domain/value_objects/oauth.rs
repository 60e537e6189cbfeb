//! Verified claims from an external identity provider.

use serde::{Deserialize, Serialize};

use crate::errors::{DomainResult, ValidationError};

/// Identity asserted by a provider after token verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAssertion {
    /// Provider-scoped subject identifier
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: bool,
}

impl OAuthAssertion {
    /// Rejects assertions without a subject or email
    pub fn validate(&self) -> DomainResult<()> {
        if self.subject.trim().is_empty() {
            return Err(ValidationError::MissingIdentityClaim {
                claim: "sub".to_string(),
            }
            .into());
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingIdentityClaim {
                claim: "email".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Name to use for a new account, falling back to the email's local part
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DomainError;

    fn assertion() -> OAuthAssertion {
        OAuthAssertion {
            subject: "1234".to_string(),
            email: "jane@example.com".to_string(),
            name: None,
            picture: None,
            email_verified: true,
        }
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let mut a = assertion();
        a.subject = "  ".to_string();
        assert!(matches!(
            a.validate(),
            Err(DomainError::ValidationErr(ValidationError::MissingIdentityClaim { .. }))
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        assert_eq!(assertion().display_name(), "jane");
        let mut named = assertion();
        named.name = Some("Jane Doe".to_string());
        assert_eq!(named.display_name(), "Jane Doe");
    }
}
