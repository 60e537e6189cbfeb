//! Brute-force protection based on recent failed logins

mod tracker;


pub use tracker::AttemptTracker;
