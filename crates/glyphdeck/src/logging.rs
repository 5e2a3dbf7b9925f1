#![forbid(unsafe_code)]

//! Structured log output for applications embedding the editor.

use tracing_subscriber::EnvFilter;

/// Install a global JSON subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies (for
/// example `"glyphdeck.history=debug"`). Fails if a global subscriber is
/// already installed.
pub fn init_json(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
