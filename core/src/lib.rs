//! # SlimmerMetAI Core
//!
//! Authentication and session-lifecycle logic for the SlimmerMetAI backend.
//! This crate contains domain entities, business services, repository interfaces,
//! and error types. It performs no I/O of its own: storage and external
//! collaborators are reached through the traits defined here.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
