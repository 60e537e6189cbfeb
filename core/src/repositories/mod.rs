pub mod login_attempt;
pub mod one_time_token;
pub mod session;
pub mod user;

pub use login_attempt::{FailureStats, LoginAttemptRepository};
pub use one_time_token::OneTimeTokenRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

#[cfg(any(test, feature = "mock"))]
pub use login_attempt::MockLoginAttemptRepository;
#[cfg(any(test, feature = "mock"))]
pub use one_time_token::MockOneTimeTokenRepository;
#[cfg(any(test, feature = "mock"))]
pub use session::MockSessionRepository;
#[cfg(any(test, feature = "mock"))]
pub use user::MockUserRepository;
