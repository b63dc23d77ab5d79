pub mod client;
pub mod prompts;
pub mod snapshot;

pub use client::{ChatOptions, OpenRouterClient, FALLBACK_MODEL, PRIMARY_MODEL};
