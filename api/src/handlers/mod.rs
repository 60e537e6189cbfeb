//! Response helpers shared by the route handlers

pub mod error;

pub use error::{handle_domain_error, handle_domain_error_with, handle_validation_errors};
