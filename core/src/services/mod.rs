//! Business services containing domain logic and use cases.

pub mod attempt;
pub mod auth;
pub mod credential;
pub mod external;
pub mod maintenance;
pub mod oauth;
pub mod one_time;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use attempt::AttemptTracker;
pub use auth::{AuthService, AuthServiceConfig};
pub use credential::CredentialService;
pub use external::{CaptchaVerifier, EmailSender, EmailTemplate, IdentityVerifier};
pub use maintenance::{CleanupResult, MaintenanceService};
pub use oauth::OAuthLinker;
pub use one_time::OneTimeTokenFlow;
pub use session::{IssuedSession, Rotation, SessionStore};
pub use token::{TokenCodec, TokenCodecConfig};
