//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt::time::Uptime;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. `json` switches to one JSON object per line.
///
/// # Errors
///
/// Returns error if a subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(Uptime::default());

    if json {
        builder
            .with_ansi(false)
            .json()
            .flatten_event(true)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing subscriber: {err}"))
    } else {
        builder
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing subscriber: {err}"))
    }
}
