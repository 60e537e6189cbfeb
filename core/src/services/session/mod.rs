//! Refresh session lifecycle: issue, rotate, revoke

mod store;

#[cfg(test)]
mod tests;

pub use store::{generate_opaque_token, IssuedSession, Rotation, SessionStore};
