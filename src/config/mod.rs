//! Configuration module for the TradeFlow core.
//!
//! Configuration is loaded from environment variables. The hosted backend
//! endpoint and service key are required: without them the application must
//! refuse to proceed rather than operate against an undefined backend.

use std::env;

use url::Url;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted backend service (required)
    pub backend_url: Url,
    /// Service key for the hosted backend (required)
    pub backend_key: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let backend_url = env::var("TRADEFLOW_BACKEND_URL")
            .map_err(|_| AppError::Config("TRADEFLOW_BACKEND_URL is not set".to_string()))?;
        let backend_url = Url::parse(&backend_url)
            .map_err(|e| AppError::Config(format!("Invalid TRADEFLOW_BACKEND_URL: {}", e)))?;

        let backend_key = env::var("TRADEFLOW_BACKEND_KEY")
            .map_err(|_| AppError::Config("TRADEFLOW_BACKEND_KEY is not set".to_string()))?;

        let log_level = env::var("TRADEFLOW_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            backend_url,
            backend_key,
            log_level,
        })
    }
}
