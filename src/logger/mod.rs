//! Logger module.
//!
//! A logging setup based on `tracing-subscriber` with console output,
//! optional JSON formatting, and an `EnvFilter`-style level string taken
//! from configuration. Mutation failures are reported through this layer
//! (they are logged, never surfaced to the caller).

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// Initialize the logger with the given configuration.
///
/// Safe to call once per process; a second call returns an error from the
/// underlying subscriber registry.
pub fn init_logger(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let is_tty = std::io::stdout().is_terminal();
    let use_ansi = config.colored && is_tty;

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logger: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logger: {e}"))?;
    }

    Ok(())
}
