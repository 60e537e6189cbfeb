//! Authentication service module
//!
//! The facade through which the HTTP layer reaches every authentication
//! flow:
//! - Registration and password login with lockout and CAPTCHA escalation
//! - Refresh token rotation and logout
//! - Password reset and email verification
//! - Sign-in with an external identity provider

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
