//! Login attempt record used for brute-force protection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single login attempt, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: Uuid,

    /// Normalised email the attempt was made for
    pub email: String,

    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub attempted_at: DateTime<Utc>,
}

impl LoginAttempt {
    pub fn new(
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
        success: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            ip_address,
            user_agent,
            success,
            attempted_at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }
}
