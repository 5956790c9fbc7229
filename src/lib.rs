//! TradeFlow business-management core.
//!
//! The headless application core of a trade-business product backed by a
//! hosted database/auth service: snapshot aggregation over four record
//! collections, per-record mutations that refetch the world, and a
//! deterministic assistant layer that answers chat queries from the
//! in-memory snapshot. The embedding UI owns rendering and the browser half
//! of identity-provider sign-in.

pub mod assistant;
pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
mod ops;
pub mod state;

pub use backend::{BackendClient, Session};
pub use config::Config;
pub use errors::AppError;
pub use models::BusinessSnapshot;
pub use state::{AppState, AppView};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for an embedding application.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the configured level.
pub fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests;
