//! Utility helpers shared by the core and api crates

pub mod validation;
