pub mod config;
pub mod db;
pub mod error;

// Domain logic
pub mod budget;

// Integrations
pub mod ai;
pub mod auth;
pub mod imports;

// Real-time notifications
pub mod notify;

// HTTP surface
pub mod api;

// CLI
pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
