//! Access token module
//!
//! Short-lived signed tokens carrying the user's id, email and role.
//! Refresh sessions live in `services::session`.

mod codec;
mod config;


pub use codec::TokenCodec;
pub use config::TokenCodecConfig;
