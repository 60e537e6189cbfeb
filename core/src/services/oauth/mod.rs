//! External identity reconciliation

mod linker;

pub use linker::OAuthLinker;
