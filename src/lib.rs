pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod ownership;
pub mod relation;
pub mod state;
pub mod validate;

pub use app::app;
pub use state::AppState;
