//! HTTP surface of the SlimmerMetAI authentication server

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use config::ApiConfig;
pub use routes::auth::AppState;
