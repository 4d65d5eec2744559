use tracing_subscriber::EnvFilter;

use crate::error::{Result, RosterError};

/// Installs a stderr subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` when the variable is unset or invalid.
pub fn init_logging(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|error| RosterError::Logging(error.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| RosterError::Logging(error.to_string()))
}
