// ABOUTME: Library root for elevate - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod platform;
pub mod types;
pub mod upgrade;
