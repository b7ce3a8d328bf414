//! Service configuration loaded from environment variables.

use std::str::FromStr;

use crate::errors::{ApiError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database holding the audit trail
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Default XAI acceptance threshold, in percent
    pub confidence_threshold: f64,
    /// Load the sample accounts, projects and agencies on startup
    pub seed_fixtures: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let confidence_threshold: f64 = parse_or("CONFIDENCE_THRESHOLD", 85.0)?;
        if !(0.0..=100.0).contains(&confidence_threshold) {
            return Err(ApiError::Config(
                "CONFIDENCE_THRESHOLD must be within [0, 100]".to_string(),
            ));
        }

        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./neel_registry.db".to_string()),
            api_port: parse_or("API_PORT", 3001)?,
            confidence_threshold,
            seed_fixtures: parse_or("SEED_FIXTURES", true)?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ApiError::Config(format!("Missing env var: {key}")))
}

/// Parse `key` if set, else fall back to `default`.
fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env_var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Config(format!("Invalid {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}
