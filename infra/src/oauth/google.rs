//! Google ID token verification through the `tokeninfo` endpoint

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use sm_core::domain::value_objects::OAuthAssertion;
use sm_core::errors::{AuthError, DomainError, DomainResult};
use sm_core::services::IdentityVerifier;
use sm_shared::config::GoogleOAuthConfig;

use crate::http::build_client;
use crate::InfrastructureError;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Google encodes some claims as strings and others as native JSON values
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Loose {
    fn as_bool(&self) -> bool {
        match self {
            Loose::Bool(b) => *b,
            Loose::Int(i) => *i != 0,
            Loose::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Loose::Int(i) => Some(*i),
            Loose::Text(s) => s.parse().ok(),
            Loose::Bool(_) => None,
        }
    }
}

/// Claims returned by `tokeninfo`
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    email_verified: Option<Loose>,
    exp: Option<Loose>,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifies Google ID tokens for one OAuth client
pub struct GoogleIdentityVerifier {
    client: Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleIdentityVerifier {
    /// Build a verifier, or `None` when no client id is configured
    pub fn from_config(config: &GoogleOAuthConfig) -> Result<Option<Self>, InfrastructureError> {
        let client_id = match config.client_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => return Ok(None),
        };

        Ok(Some(Self {
            client: build_client(config.timeout_seconds)?,
            client_id,
            tokeninfo_url: config.tokeninfo_url.clone(),
        }))
    }

    fn rejected(reason: &str) -> DomainError {
        tracing::warn!(reason, "Google ID token rejected");
        AuthError::InvalidCredentials.into()
    }

    /// Check the claims and turn them into an assertion
    fn assertion(&self, info: TokenInfo, now: i64) -> DomainResult<OAuthAssertion> {
        if info.aud.as_deref() != Some(self.client_id.as_str()) {
            return Err(Self::rejected("audience mismatch"));
        }
        match info.iss.as_deref() {
            Some(iss) if GOOGLE_ISSUERS.contains(&iss) => {}
            _ => return Err(Self::rejected("unexpected issuer")),
        }
        match info.exp.as_ref().and_then(Loose::as_i64) {
            Some(exp) if exp > now => {}
            _ => return Err(Self::rejected("token expired")),
        }

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| Self::rejected("email missing"))?;
        let email_verified = info.email_verified.as_ref().map(Loose::as_bool).unwrap_or(false);
        if !email_verified {
            return Err(Self::rejected("email not verified by Google"));
        }

        let assertion = OAuthAssertion {
            subject: info.sub.unwrap_or_default(),
            email,
            name: info.name,
            picture: info.picture,
            email_verified,
        };
        assertion.validate()?;
        Ok(assertion)
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify_id_token(&self, id_token: &str) -> DomainResult<OAuthAssertion> {
        if id_token.trim().is_empty() {
            return Err(Self::rejected("empty token"));
        }

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| DomainError::from(InfrastructureError::Http(e)))?;

        match response.status() {
            StatusCode::OK => {}
            status if status.is_client_error() => return Err(Self::rejected("tokeninfo refused")),
            status => {
                return Err(DomainError::Internal {
                    message: format!("Google tokeninfo responded with {}", status),
                })
            }
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| DomainError::from(InfrastructureError::Http(e)))?;

        self.assertion(info, Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::errors::ValidationError;

    const NOW: i64 = 1_700_000_000;

    fn verifier() -> GoogleIdentityVerifier {
        let config = GoogleOAuthConfig {
            client_id: Some("client-123.apps.googleusercontent.com".to_string()),
            ..GoogleOAuthConfig::default()
        };
        GoogleIdentityVerifier::from_config(&config).unwrap().unwrap()
    }

    fn info(json: serde_json::Value) -> TokenInfo {
        serde_json::from_value(json).unwrap()
    }

    fn valid_claims() -> serde_json::Value {
        serde_json::json!({
            "aud": "client-123.apps.googleusercontent.com",
            "iss": "https://accounts.google.com",
            "sub": "109876543210",
            "email": "anna@gmail.com",
            "email_verified": "true",
            "exp": "1700003600",
            "name": "Anna",
            "picture": "https://lh3.googleusercontent.com/a/photo"
        })
    }

    #[test]
    fn test_disabled_without_client_id() {
        let verifier = GoogleIdentityVerifier::from_config(&GoogleOAuthConfig::default()).unwrap();
        assert!(verifier.is_none());
    }

    #[test]
    fn test_valid_claims_become_assertion() {
        let assertion = verifier().assertion(info(valid_claims()), NOW).unwrap();

        assert_eq!(assertion.subject, "109876543210");
        assert_eq!(assertion.email, "anna@gmail.com");
        assert_eq!(assertion.name.as_deref(), Some("Anna"));
        assert!(assertion.email_verified);
    }

    #[test]
    fn test_native_json_types_are_accepted() {
        let mut claims = valid_claims();
        claims["email_verified"] = serde_json::json!(true);
        claims["exp"] = serde_json::json!(1_700_003_600i64);

        assert!(verifier().assertion(info(claims), NOW).is_ok());
    }

    #[test]
    fn test_foreign_audience_is_rejected() {
        let mut claims = valid_claims();
        claims["aud"] = serde_json::json!("someone-else");

        let result = verifier().assertion(info(claims), NOW);
        assert!(matches!(
            result,
            Err(DomainError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut claims = valid_claims();
        claims["exp"] = serde_json::json!("1699999999");

        assert!(verifier().assertion(info(claims), NOW).is_err());
    }

    #[test]
    fn test_unverified_email_is_rejected() {
        let mut claims = valid_claims();
        claims["email_verified"] = serde_json::json!("false");

        assert!(verifier().assertion(info(claims), NOW).is_err());
    }

    #[test]
    fn test_missing_subject_is_validation_error() {
        let mut claims = valid_claims();
        claims.as_object_mut().unwrap().remove("sub");

        let result = verifier().assertion(info(claims), NOW);
        assert!(matches!(
            result,
            Err(DomainError::ValidationErr(ValidationError::MissingIdentityClaim { .. }))
        ));
    }
}
