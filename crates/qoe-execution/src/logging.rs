//! Tracing subscriber setup for processes hosting measurement tasks.

use qoe_core::error::{QoeError, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "qoe_execution=info,qoe_infrastructure=info,qoe_core=warn";

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// # Errors
///
/// Returns `QoeError::Config` if `default_filter` cannot be parsed and
/// `QoeError::Internal` if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| QoeError::config(format!("invalid log filter '{}': {}", default_filter, e)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init()
        .map_err(|e| QoeError::internal(format!("tracing already initialised: {}", e)))
}
