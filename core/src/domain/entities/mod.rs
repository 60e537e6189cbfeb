//! Domain entities representing core business objects.

pub mod login_attempt;
pub mod one_time_token;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use login_attempt::LoginAttempt;
pub use one_time_token::{ConsumeOutcome, OneTimeToken, TokenEffect, TokenKind};
pub use token::{AccessClaims, RefreshToken, RotateOutcome};
pub use user::{User, UserProfile, UserRole};
