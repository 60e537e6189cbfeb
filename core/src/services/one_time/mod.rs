//! Password reset and email verification token flows

mod flow;


pub use flow::OneTimeTokenFlow;
