//! Value objects representing immutable domain concepts.

pub mod auth_response;
pub mod lock_state;
pub mod oauth;
pub mod request_context;

// Re-export commonly used types
pub use auth_response::{AuthResponse, AuthenticatedUser};
pub use lock_state::LockState;
pub use oauth::OAuthAssertion;
pub use request_context::RequestContext;
