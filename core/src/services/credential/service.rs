//! bcrypt-backed credential verification

use bcrypt::HashParts;
use sm_shared::PasswordPolicyConfig;

use crate::errors::{DomainError, DomainResult, ValidationError};

const DUMMY_PASSWORD: &str = "slimmermetai-dummy-password";

/// Hashes and verifies passwords and enforces the strength policy
pub struct CredentialService {
    config: PasswordPolicyConfig,
    /// Hash of a throwaway password at the configured cost
    dummy_hash: String,
}

impl CredentialService {
    /// Creates the service and precomputes the dummy hash
    ///
    /// # Returns
    ///
    /// * `Ok(CredentialService)` - Ready to use
    /// * `Err(DomainError)` - The configured cost is outside 4..=31
    pub fn new(config: PasswordPolicyConfig) -> DomainResult<Self> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, config.bcrypt_cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(Self { config, dummy_hash })
    }

    pub fn policy(&self) -> &PasswordPolicyConfig {
        &self.config
    }

    /// Hashes a password with the configured cost
    ///
    /// The password is hashed as given, without trimming or normalisation.
    pub fn hash(&self, password: &str) -> DomainResult<String> {
        bcrypt::hash(password, self.config.bcrypt_cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks a password against a stored hash
    ///
    /// A malformed hash verifies as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Burns the same work as a real verification and always fails
    ///
    /// Used when the account is unknown or has no password.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = bcrypt::verify(password, &self.dummy_hash);
        false
    }

    /// True when the hash was produced with a lower cost than configured
    pub fn needs_rehash(&self, hash: &str) -> bool {
        match hash.parse::<HashParts>() {
            Ok(parts) => parts.get_cost() < self.config.bcrypt_cost,
            Err(_) => true,
        }
    }

    pub fn is_strong(&self, password: &str) -> bool {
        self.check_strength(password).is_ok()
    }

    /// Validates length and character-class variety
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Password satisfies the policy
    /// * `Err(ValidationError::WeakPassword)` - With the reason
    pub fn check_strength(&self, password: &str) -> Result<(), ValidationError> {
        let min_length = self.config.min_length;
        if password.chars().count() < min_length {
            return Err(ValidationError::WeakPassword {
                reason: format!("must be at least {} characters long", min_length),
            });
        }

        let classes = [
            password.chars().any(|c| c.is_lowercase()),
            password.chars().any(|c| c.is_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_alphanumeric()),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        if classes < self.config.min_character_classes {
            return Err(ValidationError::WeakPassword {
                reason: format!(
                    "must contain at least {} of: lowercase letters, uppercase letters, digits, symbols",
                    self.config.min_character_classes
                ),
            });
        }

        Ok(())
    }
}
