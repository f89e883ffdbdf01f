// handlers/public/mod.rs - endpoints that need no access token

pub mod health;

pub use health::*;
