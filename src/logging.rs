//! Tracing subscriber setup
//!
//! Hosts that already install their own subscriber can skip this; the tools
//! only emit `tracing` events.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, TravelAgentError};

/// Install a global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| TravelAgentError::logging(format!("Invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| TravelAgentError::logging(format!("Failed to install subscriber: {e}")))
}
