//! Password hashing and strength rules

mod service;

pub use service::CredentialService;
