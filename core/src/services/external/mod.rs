//! Interfaces to services outside this process
//!
//! Implementations live in the infrastructure crate; in-memory doubles are
//! available under the `mock` feature.

mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use traits::{CaptchaVerifier, EmailSender, EmailTemplate, IdentityVerifier};
