//! Log subscriber setup.
//!
//! The interface owns the terminal, so log output goes to a file instead. Without a file no
//! subscriber is installed and events are discarded.

use std::{fs::File, path::Path, sync::Mutex};

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` isn't set.
const DEFAULT_FILTER: &str = "info";

/// Installs the global log subscriber writing to `log_file`.
///
/// The filter comes from `RUST_LOG` and falls back to `info`.
///
/// # Errors
///
/// This function returns an error if the file can't be created or a global subscriber is already
/// installed.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_without_file_is_noop() {
        assert!(init(None).is_ok());
    }
}
