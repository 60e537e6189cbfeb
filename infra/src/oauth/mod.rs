//! External identity providers

mod google;

pub use google::GoogleIdentityVerifier;
