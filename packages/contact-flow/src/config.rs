use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub registry_base_url: String,
    pub debounce_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            registry_base_url: env::var("REGISTRY_BASE_URL")
                .context("REGISTRY_BASE_URL must be set")?,
            debounce_ms: env::var("DEBOUNCE_MS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("DEBOUNCE_MS must be a valid number of milliseconds")?,
        })
    }
}
