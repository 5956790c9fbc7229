//! Error handling module for the TradeFlow core.
//!
//! Centralized error types. There is no retry policy and no circuit breaking:
//! every failure is terminal for the operation that raised it and recoverable
//! only by the user retrying the action.

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const AUTH_ERROR: &str = "AUTH_ERROR";
    pub const BACKEND_ERROR: &str = "BACKEND_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Required configuration is missing or malformed; fatal at startup
    Config(String),
    /// Rejection from the hosted auth endpoints
    Auth(String),
    /// Backend query or mutation rejection, including transport failures
    Backend(String),
    /// Internal error
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Auth(_) => codes::AUTH_ERROR,
            AppError::Backend(_) => codes::BACKEND_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Config(msg) => msg.clone(),
            AppError::Auth(msg) => msg.clone(),
            AppError::Backend(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Transport error: {:?}", err);
        AppError::Backend(format!("Transport error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}
