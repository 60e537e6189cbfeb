//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management and migrations
//! - Repository implementations for users, sessions, login attempts
//!   and one-time tokens

pub mod connection;
pub mod mysql;

#[cfg(test)]
mod tests;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{
    MySqlLoginAttemptRepository, MySqlOneTimeTokenRepository, MySqlSessionRepository,
    MySqlUserRepository,
};
