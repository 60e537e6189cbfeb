//! Lockout decision for an (email, ip) pair.

use serde::{Deserialize, Serialize};

/// Outcome of counting recent failed logins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    /// Hard lock; no credentials are checked while set
    pub locked: bool,

    /// Soft threshold reached, a CAPTCHA must accompany the next attempt
    pub require_captcha: bool,

    /// Seconds until the lock lifts, zero when not locked
    pub retry_after_seconds: u64,
}

impl LockState {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn captcha() -> Self {
        Self {
            locked: false,
            require_captcha: true,
            retry_after_seconds: 0,
        }
    }

    /// Hard lock, `retry_after_seconds` is raised to at least one second
    pub fn locked(retry_after_seconds: u64) -> Self {
        Self {
            locked: true,
            require_captcha: false,
            retry_after_seconds: retry_after_seconds.max(1),
        }
    }
}
